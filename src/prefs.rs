use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::OrdercastError;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredPrefs {
    realtime_enabled: bool,
}

/// On-disk store for the user's realtime enable/disable preference.
///
/// Survives restarts; a missing or unreadable file counts as enabled (the
/// push channel is optional but on by default).
pub struct PreferenceStore {
    path: PathBuf,
    cached: Mutex<bool>,
}

impl PreferenceStore {
    pub fn new(path: PathBuf) -> Self {
        let enabled = Self::read_file(&path);
        Self {
            path,
            cached: Mutex::new(enabled),
        }
    }

    fn read_file(path: &PathBuf) -> bool {
        match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str::<StoredPrefs>(&text) {
                Ok(prefs) => prefs.realtime_enabled,
                Err(e) => {
                    warn!("Unreadable preference file {:?}: {}", path, e);
                    true
                }
            },
            Err(_) => true,
        }
    }

    pub fn realtime_enabled(&self) -> bool {
        *self.cached.lock().unwrap()
    }

    pub fn set_realtime_enabled(&self, enabled: bool) -> Result<(), OrdercastError> {
        *self.cached.lock().unwrap() = enabled;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&StoredPrefs {
            realtime_enabled: enabled,
        })
        .map_err(|e| OrdercastError::Parse(e.to_string()))?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}
