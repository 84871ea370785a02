//! Integration tests for ConversationStore over the file-backed store.
//!
//! Uses tempfile::TempDir for isolated data directories.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use robo_core::config::{ConversationConfig, StorageConfig};
use robo_core::{ConversationRecord, FileStore, KeyValueStore, ResponseCatalog};
use robo_memory::ConversationStore;
use std::sync::Arc;

fn record(i: usize) -> ConversationRecord {
    let at = Utc.timestamp_opt(1_750_000_000 + i as i64, 0).unwrap();
    ConversationRecord::new(format!("message {}", i), format!("reply {}", i), at).unwrap()
}

fn open(dir: &tempfile::TempDir) -> (Arc<FileStore>, ConversationStore) {
    let backend = Arc::new(FileStore::open(dir.path()).unwrap());
    let history = ConversationStore::open(
        backend.clone(),
        &StorageConfig::default(),
        &ConversationConfig::default(),
    );
    (backend, history)
}

/// History written in one session is visible in the next.
#[test]
fn test_history_survives_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    {
        let (_backend, mut history) = open(&dir);
        for i in 0..3 {
            history.append(record(i)).unwrap();
        }
    }
    let (_backend, history) = open(&dir);
    assert_eq!(history.size(), 3);
    assert_eq!(history.last(), Some(&record(2)));
}

/// Clearing history leaves the stored catalog in place.
#[test]
fn test_clear_preserves_catalog() {
    let dir = tempfile::TempDir::new().unwrap();
    let (backend, mut history) = open(&dir);
    let catalog_key = StorageConfig::default().catalog_key();
    backend
        .set(&catalog_key, &ResponseCatalog::builtin().to_json().unwrap())
        .unwrap();
    history.append(record(0)).unwrap();

    history.clear().unwrap();

    assert!(history.is_empty());
    assert_eq!(backend.keys().unwrap(), vec![catalog_key.clone()]);
    assert_eq!(ResponseCatalog::load(backend.as_ref(), &catalog_key), ResponseCatalog::builtin());
}

/// The footprint estimate covers both namespace keys.
#[test]
fn test_size_bytes_grows_with_history() {
    let dir = tempfile::TempDir::new().unwrap();
    let (_backend, mut history) = open(&dir);
    assert_eq!(history.size_bytes().unwrap(), 0);
    history.append(record(0)).unwrap();
    let one = history.size_bytes().unwrap();
    history.append(record(1)).unwrap();
    assert!(history.size_bytes().unwrap() > one);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Appending n records keeps exactly the last min(n, capacity), in order,
    /// both in memory and on disk.
    #[test]
    fn capacity_law(n in 0usize..120) {
        let dir = tempfile::TempDir::new().unwrap();
        {
            let (_backend, mut history) = open(&dir);
            for i in 0..n {
                history.append(record(i)).unwrap();
            }
            let kept: Vec<_> = history.records().cloned().collect();
            let expected: Vec<_> = (n.saturating_sub(50)..n).map(record).collect();
            prop_assert_eq!(kept, expected);
        }
        let (_backend, reopened) = open(&dir);
        prop_assert_eq!(reopened.size(), n.min(50));
    }
}
