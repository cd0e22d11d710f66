//! Durable key/value settings

use std::collections::BTreeMap;
use std::fs;
use std::sync::{Mutex, MutexGuard, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use netbound_utils::SettingsError;
use netbound_utils::atomic_write::write_file_atomic;
use tracing::debug;

/// Key under which the last authenticated email is remembered
pub const PREVIOUS_AUTH_USER: &str = "previous_auth_user";

/// File name of the settings map inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

pub trait SettingsStore: Send + Sync {
    fn put_string(&self, key: &str, value: &str) -> Result<(), SettingsError>;

    fn get_string(&self, key: &str) -> Option<String>;

    fn remove(&self, key: &str) -> Result<(), SettingsError>;
}

/// Settings kept for the life of the process only.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl InMemorySettingsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn put_string(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn remove(&self, key: &str) -> Result<(), SettingsError> {
        self.lock().remove(key);
        Ok(())
    }
}

/// Settings persisted as a JSON object, rewritten atomically on each change.
#[derive(Debug)]
pub struct FileSettingsStore {
    path: Utf8PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileSettingsStore {
    /// Load the settings file at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<Utf8PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let values = if path.exists() {
            let text = fs::read_to_string(&path).map_err(|e| SettingsError::Read {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
            if text.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&text).map_err(|e| SettingsError::Corrupt {
                    path: path.to_string(),
                    reason: e.to_string(),
                })?
            }
        } else {
            BTreeMap::new()
        };
        debug!(path = %path, keys = values.len(), "Loaded settings");

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Open `<data_dir>/settings.json`.
    pub fn open_in(data_dir: &Utf8Path) -> Result<Self, SettingsError> {
        Self::open(data_dir.join(SETTINGS_FILE))
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `change` and persist; the in-memory map is restored on failure.
    fn update(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), SettingsError> {
        let mut values = self.lock();
        let before = values.clone();
        change(&mut *values);

        let write_error = |reason: String| SettingsError::Write {
            path: self.path.to_string(),
            reason,
        };
        let result = serde_json::to_vec_pretty(&*values)
            .map_err(|e| write_error(e.to_string()))
            .and_then(|json| {
                write_file_atomic(&self.path, &json)
                    .map(|_| ())
                    .map_err(|e| write_error(format!("{e:#}")))
            });
        if result.is_err() {
            *values = before;
        }
        result
    }
}

impl SettingsStore for FileSettingsStore {
    fn put_string(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn remove(&self, key: &str) -> Result<(), SettingsError> {
        self.update(|values| {
            values.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_round_trip() {
        let store = InMemorySettingsStore::new();
        assert_eq!(store.get_string(PREVIOUS_AUTH_USER), None);
        store.put_string(PREVIOUS_AUTH_USER, "a@b.com").unwrap();
        assert_eq!(store.get_string(PREVIOUS_AUTH_USER).as_deref(), Some("a@b.com"));
        store.remove(PREVIOUS_AUTH_USER).unwrap();
        assert_eq!(store.get_string(PREVIOUS_AUTH_USER), None);
    }
}
