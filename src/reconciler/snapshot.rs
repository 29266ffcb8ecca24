//! Slot snapshots for persistence and export
//!
//! Snapshots are stored as JSON, either inside the sled database (see
//! [`super::persistence_actor`]) or as a standalone file.

use crate::slots::SlotBinding;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Persisted slot table
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SlotSnapshot {
    /// Timestamp of snapshot creation (milliseconds since epoch)
    pub timestamp: i64,
    /// Version of the snapshot format
    pub version: String,
    pub bindings: Vec<SlotBinding>,
}

impl SlotSnapshot {
    /// Current snapshot format version
    pub const VERSION: &'static str = "1.0.0";

    pub fn new(bindings: Vec<SlotBinding>) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp_millis(),
            version: Self::VERSION.to_string(),
            bindings,
        }
    }

    /// Save snapshot to a JSON file
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize slot snapshot")?;

        fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write slot snapshot to {}", path.display()))?;

        Ok(())
    }

    /// Load snapshot from a JSON file
    pub async fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read slot snapshot {}", path.display()))?;

        let snapshot: SlotSnapshot =
            serde_json::from_str(&json).context("Failed to parse slot snapshot JSON")?;

        debug!(
            "Slot snapshot loaded (version: {}, timestamp: {}, slots: {})",
            snapshot.version,
            snapshot.timestamp,
            snapshot.bindings.len()
        );

        Ok(snapshot)
    }
}
