mod config;
pub mod database;
mod settings_store;

pub use config::AppConfig;
pub use database::Database;
pub use settings_store::{KvSettingsStore, MemorySettingsStore, SettingsStore, SETTINGS_KEY};

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns the data directory, creating it if needed.
///
/// `FOCUSISLAND_DATA_DIR` wins when set. Otherwise `~/.config/focusisland`,
/// or `~/.config/focusisland-dev` with `FOCUSISLAND_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("FOCUSISLAND_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("FOCUSISLAND_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focusisland-dev")
            } else {
                base_dir.join("focusisland")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
