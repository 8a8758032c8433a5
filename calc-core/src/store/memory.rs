//! In-process store, used by tests and as the default backend.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::factory::{StoreConfig, StoreFactory};
use super::key_value::{KeyValueStore, StoreError};

/// `HashMap`-backed store with an optional byte quota.
///
/// The quota counts key and value bytes of every entry, like browser
/// storage does. A disabled store rejects every operation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
    disabled: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// A store that behaves like switched-off storage.
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    fn check_enabled(&self) -> Result<(), StoreError> {
        if self.disabled {
            return Err(StoreError::Unavailable("storage is disabled".to_string()));
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_enabled()?;
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_enabled()?;
        let mut entries = self.lock()?;

        if let Some(limit) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if others + key.len() + value.len() > limit {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    limit,
                });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check_enabled()?;
        self.lock()?
            .remove(key)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

/// Builds a [`MemoryStore`] from a connection string: empty for an
/// unlimited store, `quota=<bytes>`, or `disabled`.
pub struct MemoryStoreFactory;

#[async_trait]
impl StoreFactory for MemoryStoreFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, config: &StoreConfig) -> Result<Box<dyn KeyValueStore>, StoreError> {
        let option = config.connection_string.trim();
        let store = match option {
            "" => MemoryStore::new(),
            "disabled" => MemoryStore::disabled(),
            _ => {
                let bytes = option
                    .strip_prefix("quota=")
                    .and_then(|b| b.trim().parse().ok())
                    .ok_or_else(|| {
                        StoreError::Configuration(format!(
                            "invalid memory store option '{option}'"
                        ))
                    })?;
                MemoryStore::with_quota(bytes)
            }
        };
        Ok(Box::new(store))
    }
}
