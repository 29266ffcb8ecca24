//! Hot reload of the auto-assign settings
//!
//! The parent directory is watched rather than the file, so editors that
//! save by rename are still seen. Bursts of filesystem events collapse into
//! one reload after a short settle delay, and only a changed `auto_assign`
//! section is reported. Debounce and logging settings apply at startup only.

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::{AppConfig, AutoAssignConfig};

/// Quiet period after the last event before the file is read
const SETTLE_DELAY: Duration = Duration::from_millis(150);

/// Reports auto-assign settings that differ from the last ones reported
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    settings_rx: mpsc::Receiver<AutoAssignConfig>,
}

impl ConfigWatcher {
    /// Load `config_path` and start watching it
    ///
    /// # Errors
    ///
    /// Fails if the initial config is missing or invalid, or the directory
    /// cannot be watched.
    pub async fn new(config_path: impl Into<PathBuf>) -> Result<(Self, AppConfig)> {
        let config_path = config_path.into();
        let path_str = config_path.to_string_lossy().to_string();

        let initial = AppConfig::load(&path_str)
            .await
            .context("Failed to load initial config")?;

        let file_name = config_path
            .file_name()
            .map(|n| n.to_os_string())
            .with_context(|| format!("Config path has no file name: {}", path_str))?;
        let watch_dir = match config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        // Capacity 1: a pending wake-up already covers any later event
        let (dirty_tx, dirty_rx) = mpsc::channel::<()>(1);
        let (settings_tx, settings_rx) = mpsc::channel(4);

        // notify calls back on its own thread
        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                let touches_config = event
                    .paths
                    .iter()
                    .any(|p| p.file_name() == Some(file_name.as_os_str()));
                if touches_config && matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    let _ = dirty_tx.try_send(());
                }
            }
            Err(e) => error!("Config watch error: {}", e),
        })?;

        watcher
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config directory: {}", watch_dir.display()))?;

        tokio::spawn(reload_loop(
            path_str.clone(),
            initial.auto_assign.clone(),
            dirty_rx,
            settings_tx,
        ));

        info!("Config watcher started for: {}", path_str);

        Ok((
            Self {
                _watcher: watcher,
                settings_rx,
            },
            initial,
        ))
    }

    /// Wait for the next settings change
    ///
    /// Returns `None` once the watcher has stopped.
    pub async fn next_settings(&mut self) -> Option<AutoAssignConfig> {
        self.settings_rx.recv().await
    }
}

async fn reload_loop(
    config_path: String,
    mut applied: AutoAssignConfig,
    mut dirty_rx: mpsc::Receiver<()>,
    settings_tx: mpsc::Sender<AutoAssignConfig>,
) {
    while dirty_rx.recv().await.is_some() {
        // Let the writer finish, then swallow the rest of the burst
        tokio::time::sleep(SETTLE_DELAY).await;
        while dirty_rx.try_recv().is_ok() {}

        let config = match AppConfig::load(&config_path).await {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config change (keeping current settings): {:#}", e);
                continue;
            }
        };

        if config.auto_assign == applied {
            debug!("Config file changed, auto-assign settings unchanged");
            continue;
        }

        info!("Auto-assign settings changed on disk");
        applied = config.auto_assign.clone();
        if settings_tx.send(config.auto_assign).await.is_err() {
            break;
        }
    }
    debug!("Config reload loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_settings_change_is_reported() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("padslots.yaml");
        fs::write(&config_path, "auto_assign:\n  max_slots: 4\n")?;

        let (mut watcher, config) = ConfigWatcher::new(&config_path).await?;
        assert_eq!(config.auto_assign.max_slots, 4);
        assert!(config.auto_assign.enabled);

        tokio::time::sleep(Duration::from_millis(100)).await;
        fs::write(&config_path, "auto_assign:\n  enabled: false\n  max_slots: 6\n")?;

        // Filesystem notifications are best effort on some CI filesystems
        let changed = tokio::time::timeout(Duration::from_secs(2), watcher.next_settings()).await;
        if let Ok(Some(settings)) = changed {
            assert_eq!(settings.max_slots, 6);
            assert!(!settings.enabled);
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_unrelated_change_is_not_reported() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("padslots.yaml");
        fs::write(&config_path, "auto_assign:\n  max_slots: 4\n")?;

        let (mut watcher, _) = ConfigWatcher::new(&config_path).await?;

        tokio::time::sleep(Duration::from_millis(100)).await;
        fs::write(
            &config_path,
            "auto_assign:\n  max_slots: 4\npersistence:\n  debounce_ms: 900\n",
        )?;
        fs::write(temp_dir.path().join("other.yaml"), "auto_assign:\n  max_slots: 2\n")?;

        let changed = tokio::time::timeout(Duration::from_millis(800), watcher.next_settings()).await;
        assert!(changed.is_err(), "unexpected settings: {:?}", changed);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_initial_config_fails() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("padslots.yaml");
        fs::write(&config_path, "auto_assign:\n  max_slots: 0\n")?;

        assert!(ConfigWatcher::new(&config_path).await.is_err());
        Ok(())
    }
}
