use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Key not found")]
    NotFound,

    /// Storage is switched off or cannot be reached.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage quota of {limit} bytes exceeded while writing '{key}'")]
    QuotaExceeded { key: String, limit: usize },

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// String-keyed persistent storage for saved results.
///
/// Writers are not coordinated: two processes writing the same key race and
/// the last write wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, `None` if the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deletes `key`; [`StoreError::NotFound`] if it was never written.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
