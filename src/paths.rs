//! Where config, saved slots and logs live
//!
//! - **Working-directory mode** (debug builds): `padslots.yaml` in the current
//!   directory wins, with state and logs next to it.
//! - **Portable mode**: a `.portable` marker next to the executable keeps every
//!   file beside the binary.
//! - **Installed mode** (default): the platform data directory, e.g.
//!   `~/.local/share/Padslots` or `%APPDATA%\Padslots`.

use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name used in installed mode
const APP_NAME: &str = "Padslots";

pub const CONFIG_FILE: &str = "padslots.yaml";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config: PathBuf,
    /// Holds the sled database with the saved slot table
    pub state_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub is_portable: bool,
}

impl AppPaths {
    /// Lay out every path under a single directory
    pub fn in_dir(base: impl AsRef<Path>, is_portable: bool) -> Self {
        let base = base.as_ref();
        Self {
            config: base.join(CONFIG_FILE),
            state_dir: base.join(".state"),
            logs_dir: base.join("logs"),
            is_portable,
        }
    }

    /// Pick a layout based on the environment
    ///
    /// Runs before logging is set up, so diagnostics go to stderr.
    pub fn detect() -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));

        #[cfg(debug_assertions)]
        {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            if cwd.join(CONFIG_FILE).exists() {
                eprintln!("[paths] Using working directory {}", cwd.display());
                return Self::in_dir(cwd, true);
            }
        }

        if exe_dir.join(".portable").exists() {
            #[cfg(debug_assertions)]
            eprintln!("[paths] Running in PORTABLE mode (.portable marker found)");
            return Self::in_dir(exe_dir, true);
        }

        let app_data = dirs::data_dir()
            .unwrap_or_else(|| {
                eprintln!("[paths] WARNING: no platform data directory, falling back to exe dir");
                exe_dir.clone()
            })
            .join(APP_NAME);

        Self {
            config: app_data.join(CONFIG_FILE),
            state_dir: app_data.join("state"),
            logs_dir: app_data.join("logs"),
            is_portable: false,
        }
    }

    /// Directory holding the config file
    pub fn base_dir(&self) -> PathBuf {
        self.config
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Create the state, logs and config directories if missing
    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        for dir in [self.state_dir.clone(), self.logs_dir.clone(), self.base_dir()] {
            if !dir.exists() {
                debug!("Creating directory: {}", dir.display());
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
        }
        Ok(())
    }

    pub fn sled_db_path(&self) -> PathBuf {
        self.state_dir.join("sled")
    }
}
