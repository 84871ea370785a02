//! Conversation history: append-only, size-bounded, persisted.
//!
//! The full record sequence is written back to the key-value store after
//! every append. A failed write never loses the in-memory record; it is
//! reported to the caller as `PersistenceFailure` and the session carries on.

use robo_core::config::{ConversationConfig, StorageConfig};
use robo_core::storage::namespace_size_bytes;
use robo_core::{
    CompanionError, ConversationRecord, KeyValueStore, StorageError, StorageStatus, StorageUsage,
};
use std::collections::VecDeque;
use std::sync::Arc;

pub struct ConversationStore {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
    key: String,
    capacity: usize,
    records: VecDeque<ConversationRecord>,
}

impl ConversationStore {
    /// Open the history persisted under the configured key. Unreadable
    /// history is discarded and the store starts empty.
    pub fn open(
        store: Arc<dyn KeyValueStore>,
        storage: &StorageConfig,
        conversation: &ConversationConfig,
    ) -> Self {
        Self::with_key(
            store,
            &storage.namespace,
            &storage.conversation_key(),
            conversation.capacity,
        )
    }

    pub fn with_key(
        store: Arc<dyn KeyValueStore>,
        namespace: &str,
        key: &str,
        capacity: usize,
    ) -> Self {
        let mut records = match store.get(key) {
            Ok(Some(raw)) => match serde_json::from_str::<VecDeque<ConversationRecord>>(&raw) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!("Discarding unreadable conversation history: {}", e);
                    VecDeque::new()
                }
            },
            Ok(None) => VecDeque::new(),
            Err(e) => {
                tracing::warn!("Could not read conversation history: {}", e);
                VecDeque::new()
            }
        };
        while records.len() > capacity {
            records.pop_front();
        }
        tracing::debug!("Opened conversation history with {} records", records.len());

        Self {
            store,
            namespace: namespace.to_string(),
            key: key.to_string(),
            capacity,
            records,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records oldest first.
    pub fn records(&self) -> impl Iterator<Item = &ConversationRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&ConversationRecord> {
        self.records.back()
    }

    /// Append, evict the oldest records beyond capacity, then persist.
    ///
    /// On `Err(PersistenceFailure)` the record is still held in memory.
    pub fn append(&mut self, record: ConversationRecord) -> Result<(), CompanionError> {
        self.records.push_back(record);
        let mut evicted = 0;
        while self.records.len() > self.capacity {
            self.records.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            tracing::debug!("Evicted {} oldest conversation records", evicted);
        }
        self.persist()
    }

    /// Drop all history, in memory and persisted. Other keys are untouched.
    pub fn clear(&mut self) -> Result<(), CompanionError> {
        self.records.clear();
        self.store.remove(&self.key)?;
        tracing::info!("Conversation history cleared");
        Ok(())
    }

    /// Approximate footprint of every persisted key in this namespace.
    pub fn size_bytes(&self) -> Result<u64, CompanionError> {
        Ok(namespace_size_bytes(self.store.as_ref(), &self.namespace)?)
    }

    pub fn storage_status(&self) -> StorageStatus {
        match self.size_bytes() {
            Ok(bytes) => StorageStatus::Used(StorageUsage { bytes }),
            Err(e) => {
                tracing::warn!("Could not measure storage: {}", e);
                StorageStatus::Error
            }
        }
    }

    fn persist(&self) -> Result<(), CompanionError> {
        let write = serde_json::to_string(&self.records)
            .map_err(StorageError::from)
            .and_then(|raw| self.store.set(&self.key, &raw));
        if let Err(e) = write {
            tracing::warn!("Could not save conversation: {}", e);
            return Err(e.into());
        }
        Ok(())
    }
}
