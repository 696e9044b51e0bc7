//! Persisted relay state
//!
//! A small local record used only to prefill client-side configuration:
//! last used endpoint, last printer, recent print history. Written on
//! explicit save by a single process; the rendering pipeline never
//! reads it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// History entries kept; older prints roll off
const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub order_name: String,
    pub total: f64,
    pub printed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RelaySettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_device_name: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// File-backed settings store
pub struct SettingsStore {
    path: PathBuf,
    settings: RelaySettings,
}

impl SettingsStore {
    /// Load existing settings or start from defaults
    pub fn open(work_dir: impl AsRef<Path>) -> Self {
        let path = work_dir.as_ref().join("relay-settings.json");
        let settings = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "settings unreadable, starting fresh");
                RelaySettings::default()
            }),
            Err(_) => RelaySettings::default(),
        };
        Self { path, settings }
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    pub fn set_last_endpoint(&mut self, endpoint: impl Into<String>) {
        self.settings.last_endpoint = Some(endpoint.into());
    }

    pub fn set_last_device(&mut self, device: impl Into<String>) {
        self.settings.last_device_name = Some(device.into());
    }

    /// Prepend one print to the history, keeping the newest entries
    pub fn record_print(&mut self, order_name: &str, total: f64) {
        self.settings.history.insert(
            0,
            HistoryEntry {
                order_name: order_name.to_string(),
                total,
                printed_at: Utc::now(),
            },
        );
        self.settings.history.truncate(HISTORY_LIMIT);
    }

    /// Write the settings file (the explicit-save point)
    pub fn save(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.settings)?;
        std::fs::write(&self.path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = SettingsStore::open(dir.path());
        store.set_last_endpoint("http://192.168.1.10:8766");
        store.set_last_device("POS80");
        store.record_print("Shop/0042", 2500.0);
        store.save().unwrap();

        let reloaded = SettingsStore::open(dir.path());
        assert_eq!(reloaded.settings(), store.settings());
        assert_eq!(reloaded.settings().history.len(), 1);
    }

    #[test]
    fn history_is_capped_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::open(dir.path());

        for i in 0..60 {
            store.record_print(&format!("Shop/{i:04}"), i as f64);
        }

        let history = &store.settings().history;
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].order_name, "Shop/0059");
    }

    #[test]
    fn corrupt_settings_start_fresh() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("relay-settings.json"), "{not json").unwrap();

        let store = SettingsStore::open(dir.path());
        assert_eq!(store.settings(), &RelaySettings::default());
    }
}
