//! Key-value store capability.
//!
//! Components that need to remember something across views (a banner the
//! user dismissed, data fetched on one page and consumed on the next, an
//! in-progress wizard) receive a `&dyn Store` explicitly. Writes are
//! last-writer-wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CoreError;
use crate::wizard::SavedWizard;

pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn set(&self, key: &str, value: String) -> Result<(), CoreError>;
    fn remove(&self, key: &str) -> Result<(), CoreError>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Process-local store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, CoreError> {
        self.entries
            .lock()
            .map_err(|_| CoreError::Storage("memory store lock poisoned".to_string()))
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), CoreError> {
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON file store
// ---------------------------------------------------------------------------

/// Store persisted as a single JSON object on disk.
///
/// The file is read on every access and rewritten on every change, so
/// separate handles on the same path observe each other's writes.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, CoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                CoreError::Storage(format!("{} is not a valid store: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(CoreError::Storage(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    /// Write to a sibling temp file, then rename over the store so readers
    /// never observe a partial file.
    fn save(&self, entries: &HashMap<String, String>) -> Result<(), CoreError> {
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| CoreError::Storage(e.to_string()))?;

        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp = self.path.with_file_name(tmp_name);

        std::fs::write(&tmp, raw)
            .and_then(|()| std::fs::rename(&tmp, &self.path))
            .map_err(|e| {
                CoreError::Storage(format!("failed to write {}: {e}", self.path.display()))
            })
    }

    fn update(&self, f: impl FnOnce(&mut HashMap<String, String>)) -> Result<(), CoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| CoreError::Storage("file store lock poisoned".to_string()))?;
        let mut entries = self.load()?;
        f(&mut entries);
        self.save(&entries)
    }
}

impl Store for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: String) -> Result<(), CoreError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value);
        })
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

// ---------------------------------------------------------------------------
// Use cases
// ---------------------------------------------------------------------------

/// An informational banner that, once dismissed, stays hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DismissibleBanner {
    key: &'static str,
}

impl DismissibleBanner {
    pub const fn new(key: &'static str) -> Self {
        Self { key }
    }

    /// Whether the banner should be hidden. Storage failures show it.
    pub fn is_dismissed(&self, store: &dyn Store) -> bool {
        match store.get(self.key) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                tracing::warn!(key = self.key, error = %e, "Failed to read banner state");
                false
            }
        }
    }

    pub fn dismiss(&self, store: &dyn Store) -> Result<(), CoreError> {
        store.set(self.key, "true".to_string())
    }
}

/// Hand data from one view to the next.
pub fn handoff_put<T: Serialize>(store: &dyn Store, key: &str, value: &T) -> Result<(), CoreError> {
    let raw = serde_json::to_string(value).map_err(|e| CoreError::Storage(e.to_string()))?;
    store.set(key, raw)
}

/// Read and remove handed-off data. A missing entry yields `None`.
pub fn handoff_take<T: DeserializeOwned>(
    store: &dyn Store,
    key: &str,
) -> Result<Option<T>, CoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    store.remove(key)?;
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| CoreError::Storage(format!("handoff '{key}' is malformed: {e}")))
}

/// Persist an in-progress wizard under `key`.
pub fn save_wizard(store: &dyn Store, key: &str, saved: &SavedWizard) -> Result<(), CoreError> {
    handoff_put(store, key, saved)
}

/// Load (and clear) a wizard persisted with [`save_wizard`].
pub fn take_wizard(store: &dyn Store, key: &str) -> Result<Option<SavedWizard>, CoreError> {
    handoff_take(store, key)
}
