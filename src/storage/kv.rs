//! Key-value storage backends
//!
//! The config store persists its whole list into a single named slot. Any
//! backend that can get and set a string by key will do.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;

use super::file_io::{read_optional, write_atomic};

/// Durable string slots addressed by key
pub trait KeyValueStore: Send + Sync {
    /// Read a slot; `None` if it has never been written
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError>;

    /// Replace a slot's contents
    fn set(&self, key: &str, value: &str) -> Result<(), LedgerError>;

    /// Remove a slot; removing a missing slot is not an error
    fn remove(&self, key: &str) -> Result<(), LedgerError>;
}

/// One `<key>.json` file per slot inside a directory
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
        read_optional(self.slot_path(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LedgerError> {
        write_atomic(self.slot_path(key), value.as_bytes())
    }

    fn remove(&self, key: &str) -> Result<(), LedgerError> {
        let path = self.slot_path(key);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| {
                LedgerError::Storage(format!("Failed to remove {}: {}", path.display(), e))
            })?;
        }
        Ok(())
    }
}

/// Process-local store, used in tests and by embedders without a disk
#[derive(Default)]
pub struct MemoryKeyValueStore {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
        let slots = self
            .slots
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LedgerError> {
        let mut slots = self
            .slots
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), LedgerError> {
        let mut slots = self
            .slots
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        slots.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exercise(store: &dyn KeyValueStore) {
        assert!(store.get("export_configs").unwrap().is_none());

        store.set("export_configs", "[1,2,3]").unwrap();
        assert_eq!(store.get("export_configs").unwrap().as_deref(), Some("[1,2,3]"));

        store.set("export_configs", "[]").unwrap();
        assert_eq!(store.get("export_configs").unwrap().as_deref(), Some("[]"));

        store.remove("export_configs").unwrap();
        assert!(store.get("export_configs").unwrap().is_none());
        store.remove("export_configs").unwrap();
    }

    #[test]
    fn test_memory_store() {
        exercise(&MemoryKeyValueStore::new());
    }

    #[test]
    fn test_file_store() {
        let temp_dir = TempDir::new().unwrap();
        exercise(&FileKeyValueStore::new(temp_dir.path().to_path_buf()));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        FileKeyValueStore::new(temp_dir.path().to_path_buf())
            .set("slot", "persisted")
            .unwrap();

        let reopened = FileKeyValueStore::new(temp_dir.path().to_path_buf());
        assert_eq!(reopened.get("slot").unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_file_store_sanitizes_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().to_path_buf());
        store.set("../escape", "x").unwrap();
        assert!(temp_dir.path().join("___escape.json").exists());
    }
}
