//! Local key-value string storage.
//!
//! Values are opaque UTF-8 strings. Footprint is modelled as two bytes per
//! character, the way browser local storage accounts for UTF-16 text.

use crate::error::StorageError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Estimated bytes a value occupies.
pub fn footprint(value: &str) -> u64 {
    2 * value.chars().count() as u64
}

/// Sum of footprints over every key that starts with `namespace`.
pub fn namespace_size_bytes(
    store: &dyn KeyValueStore,
    namespace: &str,
) -> Result<u64, StorageError> {
    let mut total = 0;
    for key in store.keys()?.into_iter().filter(|k| k.starts_with(namespace)) {
        if let Some(value) = store.get(&key)? {
            total += footprint(&value);
        }
    }
    Ok(total)
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// Process-local store with an optional quota.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    quota: Option<u64>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `set` fails once total footprint would exceed `quota` bytes.
    pub fn with_quota(quota: u64) -> Self {
        Self {
            entries: Mutex::default(),
            quota: Some(quota),
        }
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        // Entries stay consistent even if a writer panicked mid-call.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let mut entries = self.entries();
        if let Some(quota) = self.quota {
            let others: u64 = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| footprint(v))
                .sum();
            let needed = others + footprint(value);
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries().keys().cloned().collect())
    }
}

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    quota: Option<u64>,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, quota: None })
    }

    /// Cap the total footprint of every key in the directory at `quota` bytes.
    pub fn with_quota(mut self, quota: Option<u64>) -> Self {
        self.quota = quota;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if let Some(quota) = self.quota {
            let mut others = 0;
            for other in self.keys()?.into_iter().filter(|k| k != key) {
                if let Some(v) = self.get(&other)? {
                    others += footprint(&v);
                }
            }
            let needed = others + footprint(value);
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        // Write-then-rename so a crash never leaves a half-written value.
        let tmp = self.dir.join(format!("{}.tmp", key));
        std::fs::write(&tmp, value)?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if validate_key(name).is_ok() {
                    keys.push(name.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_roundtrip() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("robo_a").unwrap(), None);
        store.set("robo_a", "value").unwrap();
        assert_eq!(store.get("robo_a").unwrap().as_deref(), Some("value"));
        store.remove("robo_a").unwrap();
        assert_eq!(store.get("robo_a").unwrap(), None);
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let store = InMemoryStore::with_quota(10);
        store.set("robo_a", "abcde").unwrap(); // 10 bytes, exactly at quota
        let err = store.set("robo_b", "x").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 12, quota: 10 }));
        // Overwriting the same key only counts the new value
        store.set("robo_a", "abc").unwrap();
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let store = InMemoryStore::new();
        assert!(matches!(store.set("../etc", "x"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(store.set("", "x"), Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn test_namespace_size_counts_only_namespace() {
        let store = InMemoryStore::new();
        store.set("robo_one", "abc").unwrap();
        store.set("robo_two", "héllo").unwrap();
        store.set("other", "ignored entirely").unwrap();
        assert_eq!(namespace_size_bytes(&store, "robo_").unwrap(), 2 * 3 + 2 * 5);
    }

    #[test]
    fn test_file_store_roundtrip_and_keys() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("data")).unwrap();
        store.set("robo_conversations", "[]").unwrap();
        store.set("robo_responses", "{}").unwrap();
        assert_eq!(
            store.keys().unwrap(),
            vec!["robo_conversations".to_string(), "robo_responses".to_string()]
        );
        assert_eq!(store.get("robo_responses").unwrap().as_deref(), Some("{}"));
        store.remove("robo_responses").unwrap();
        store.remove("robo_responses").unwrap(); // removing twice is fine
        assert_eq!(store.get("robo_responses").unwrap(), None);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            store.set("robo_k", "persisted").unwrap();
        }
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("robo_k").unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_file_store_quota() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap().with_quota(Some(10));
        store.set("a", "abc").unwrap();
        // Overwriting a key only counts the new value
        store.set("a", "abcd").unwrap();
        let err = store.set("b", "xy").unwrap_err();
        assert!(matches!(
            err,
            StorageError::QuotaExceeded { needed: 12, quota: 10 }
        ));
        assert!(store.get("b").unwrap().is_none());
    }

    #[test]
    fn test_failed_rename_leaves_no_temp_file() {
        let dir = tempfile::TempDir::new().unwrap();
        // A non-empty directory where the value file should go blocks the rename
        std::fs::create_dir(dir.path().join("robo_k")).unwrap();
        std::fs::write(dir.path().join("robo_k").join("inner"), "x").unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert!(matches!(store.set("robo_k", "value"), Err(StorageError::Io(_))));
        assert!(!dir.path().join("robo_k.tmp").exists());
    }
}
