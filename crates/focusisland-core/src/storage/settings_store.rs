//! Load/save of the flat [`Settings`] record.

use std::sync::{Arc, Mutex};

use tracing::warn;

use super::Database;
use crate::error::Result;
use crate::settings::Settings;

/// Fixed key of the settings record in the kv store.
pub const SETTINGS_KEY: &str = "FocusSettings.v1";

/// Persistence for the settings record.
pub trait SettingsStore: Send {
    /// Stored settings, or defaults when missing, corrupt or invalid.
    fn load(&self) -> Settings;

    fn save(&self, settings: &Settings) -> Result<()>;
}

/// Settings stored as JSON under [`SETTINGS_KEY`].
#[derive(Debug)]
pub struct KvSettingsStore {
    db: Database,
}

impl KvSettingsStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Remove the stored record so the next load yields defaults.
    pub fn clear(&self) -> Result<()> {
        self.db.kv_delete(SETTINGS_KEY)?;
        Ok(())
    }
}

impl SettingsStore for KvSettingsStore {
    fn load(&self) -> Settings {
        let raw = match self.db.kv_get(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Settings::default(),
            Err(e) => {
                warn!(error = %e, "failed to read settings; using defaults");
                return Settings::default();
            }
        };
        match serde_json::from_str::<Settings>(&raw) {
            Ok(settings) if settings.validate().is_ok() => settings,
            Ok(settings) => {
                warn!(?settings, "stored settings are invalid; using defaults");
                Settings::default()
            }
            Err(e) => {
                warn!(error = %e, "stored settings are corrupt; using defaults");
                Settings::default()
            }
        }
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        self.db.kv_set(SETTINGS_KEY, &json)
    }
}

/// In-process store; clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    record: Arc<Mutex<Option<Settings>>>,
    saves: Arc<Mutex<usize>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(settings: Settings) -> Self {
        let store = Self::default();
        *store.record.lock().unwrap_or_else(|e| e.into_inner()) = Some(settings);
        store
    }

    /// Number of completed `save` calls.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn stored(&self) -> Option<Settings> {
        *self.record.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Settings {
        self.stored().unwrap_or_default()
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = Some(*settings);
        *self.saves.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }
}
