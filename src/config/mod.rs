//! Configuration management for padslots
//!
//! Handles loading, parsing, and hot-reloading of the YAML settings file.

pub mod watcher;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::SlotError;
use crate::slots::{LedOverflow, PassOptions, DEFAULT_MAX_SLOTS, MAX_SLOTS_LIMIT};

pub use watcher::ConfigWatcher;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub auto_assign: AutoAssignConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Automatic controller assignment
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AutoAssignConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_slots")]
    pub max_slots: usize,
    /// LED behavior for slots beyond the 8-color palette
    #[serde(default)]
    pub led_overflow: LedOverflow,
}

/// Slot persistence settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PersistenceConfig {
    /// Debounce window for writes (0 writes immediately)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Log output settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Also write a daily-rolling log file in the logs directory
    #[serde(default = "default_true")]
    pub file: bool,
}

impl Default for AutoAssignConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_slots: DEFAULT_MAX_SLOTS,
            led_overflow: LedOverflow::default(),
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { file: true }
    }
}

impl AutoAssignConfig {
    /// Options for a single reconciliation pass
    pub fn pass_options(&self) -> PassOptions {
        PassOptions {
            max_slots: self.max_slots,
            led_overflow: self.led_overflow,
        }
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path))?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        let max_slots = self.auto_assign.max_slots;
        if max_slots == 0 || max_slots > MAX_SLOTS_LIMIT {
            return Err(SlotError::Config(format!(
                "auto_assign.max_slots is {} (must be 1-{})",
                max_slots, MAX_SLOTS_LIMIT
            ))
            .into());
        }

        if self.persistence.debounce_ms > 60_000 {
            return Err(SlotError::Config(format!(
                "persistence.debounce_ms is {} (must be at most 60000)",
                self.persistence.debounce_ms
            ))
            .into());
        }

        Ok(())
    }
}

// Default value functions
fn default_true() -> bool { true }
fn default_max_slots() -> usize { DEFAULT_MAX_SLOTS }
fn default_debounce_ms() -> u64 { crate::reconciler::DEFAULT_DEBOUNCE_MS }
