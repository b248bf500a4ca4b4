//! Key-value string storage for persisted collections.
//!
//! Writes are best-effort: the store logs a failed `save` and carries on.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use parking_lot::Mutex;
use zipsnap_core::PersistenceError;

/// Key holding the serialized search history.
pub const HISTORY_KEY: &str = "zipSearchHistory";
/// Key holding the serialized favorites.
pub const FAVORITES_KEY: &str = "zipFavorites";

pub trait PersistenceAdapter: Send + Sync {
    /// Stored value for `key`, or `None` if nothing is stored or it can't be read.
    fn load(&self, key: &str) -> Option<String>;

    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// One JSON file per key under a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl PersistenceAdapter for JsonFileStore {
    fn load(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("Failed to read {:?}: {}", path, e);
                None
            }
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| PersistenceError::Unavailable(format!("{:?}: {}", self.dir, e)))?;

        // Write then rename so a crash never leaves a half-written file
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| PersistenceError::WriteFailed {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!("Saved {} ({} bytes) to {:?}", key, value.len(), path);
        Ok(())
    }
}

/// In-memory storage; contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, e.g. with data from a previous session.
    pub fn with_entry(self, key: &str, value: impl Into<String>) -> Self {
        self.entries.lock().insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }
}

impl PersistenceAdapter for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.get(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.load(HISTORY_KEY).is_none());
    }

    #[test]
    fn test_file_store_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data"));

        store.save(FAVORITES_KEY, "[]").unwrap();

        assert_eq!(store.load(FAVORITES_KEY).as_deref(), Some("[]"));
        assert!(dir.path().join("data").join("zipFavorites.json").exists());
        assert!(!dir.path().join("data").join("zipFavorites.json.tmp").exists());
    }

    #[test]
    fn test_file_store_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        store.save(HISTORY_KEY, "[1]").unwrap();
        store.save(HISTORY_KEY, "[2]").unwrap();

        assert_eq!(store.load(HISTORY_KEY).as_deref(), Some("[2]"));
    }

    #[test]
    fn test_file_store_unwritable_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let store = JsonFileStore::new(blocker.join("data"));
        let result = store.save(HISTORY_KEY, "[]");

        assert!(matches!(result, Err(PersistenceError::Unavailable(_))));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new().with_entry(HISTORY_KEY, "[]");
        assert_eq!(store.load(HISTORY_KEY).as_deref(), Some("[]"));
        assert!(store.load(FAVORITES_KEY).is_none());

        store.save(FAVORITES_KEY, "[1]").unwrap();
        assert_eq!(store.get(FAVORITES_KEY).as_deref(), Some("[1]"));
    }
}
