use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct UserSettings {
    /// The current focus note. Key name matches what the app has always
    /// persisted, so existing data files keep working.
    #[serde(rename = "focusTask", default)]
    focus_task: String,
}

/// Durable store for the task note. Read once at startup, rewritten on every
/// change; a missing or unreadable file means an empty task.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn task(&self) -> String {
        self.data.read().unwrap().focus_task.clone()
    }

    pub fn update_task(&self, task: String) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.focus_task = task;
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
