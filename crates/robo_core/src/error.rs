use crate::TopicKey;
use thiserror::Error;

/// Failures of the persistent key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage quota exceeded: {needed} bytes needed, quota is {quota} bytes")]
    QuotaExceeded { needed: u64, quota: u64 },

    #[error("invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Recoverable failures of the companion core. None of them end a session.
#[derive(Debug, Error)]
pub enum CompanionError {
    #[error("input is empty")]
    EmptyInput,

    #[error("topic '{0}' has no replies in the catalog")]
    MissingTopic(TopicKey),

    #[error("could not persist conversation: {0}")]
    PersistenceFailure(#[from] StorageError),

    #[error("could not load response catalog: {0}")]
    CatalogLoadFailure(String),
}
