//! Saved-results history.
//!
//! Each history key holds a JSON array of [`SavedResult`] entries, most
//! recent first. Entries that do not parse are kept in place on write and
//! skipped on read, so a key shared with another writer is never clobbered.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::key_value::{KeyValueStore, StoreError};
use crate::models::{HistoryPolicy, SavedResult};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The stored value is not a JSON array. It is left untouched.
    #[error("saved results under '{key}' are not a JSON list: {reason}")]
    Corrupted { key: String, reason: String },

    #[error("could not serialize saved result: {0}")]
    Serialize(String),
}

pub struct ResultHistory {
    store: Box<dyn KeyValueStore>,
}

impl ResultHistory {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Prepends `result` to the list under `policy.key` and truncates the
    /// list to `policy.limit` entries.
    ///
    /// # Errors
    /// Nothing is written when the existing value is corrupted or the store
    /// rejects the write.
    pub async fn save(
        &self,
        policy: &HistoryPolicy,
        result: SavedResult,
    ) -> Result<(), HistoryError> {
        let mut entries = self.raw_entries(&policy.key).await?;
        let entry =
            serde_json::to_value(&result).map_err(|e| HistoryError::Serialize(e.to_string()))?;
        entries.insert(0, entry);
        entries.truncate(policy.limit.max(1));

        let encoded = serde_json::to_string(&entries)
            .map_err(|e| HistoryError::Serialize(e.to_string()))?;
        self.store.set(&policy.key, &encoded).await?;
        debug!(key = %policy.key, entries = entries.len(), "history written");
        Ok(())
    }

    /// Every readable entry under `policy.key`, most recent first.
    pub async fn list(
        &self,
        policy: &HistoryPolicy,
    ) -> Result<Vec<SavedResult>, HistoryError> {
        let entries = self.raw_entries(&policy.key).await?;
        Ok(entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| {
                serde_json::from_value::<SavedResult>(value)
                    .inspect_err(|e| {
                        warn!(key = %policy.key, index, "skipping unreadable saved result: {e}")
                    })
                    .ok()
            })
            .collect())
    }

    /// Entries saved by calculator `slug`. Keys may be shared by several calculators.
    pub async fn list_for(
        &self,
        policy: &HistoryPolicy,
        slug: &str,
    ) -> Result<Vec<SavedResult>, HistoryError> {
        let mut entries = self.list(policy).await?;
        entries.retain(|e| e.slug == slug);
        Ok(entries)
    }

    /// Deletes the whole list under `policy.key`.
    pub async fn clear(
        &self,
        policy: &HistoryPolicy,
    ) -> Result<(), HistoryError> {
        match self.store.remove(&policy.key).await {
            Ok(()) | Err(StoreError::NotFound) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn raw_entries(
        &self,
        key: &str,
    ) -> Result<Vec<Value>, HistoryError> {
        match self.store.get(key).await? {
            None => Ok(Vec::new()),
            Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Some(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Array(entries)) => Ok(entries),
                Ok(other) => Err(HistoryError::Corrupted {
                    key: key.to_string(),
                    reason: format!("found {}", json_kind(&other)),
                }),
                Err(e) => Err(HistoryError::Corrupted {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            },
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::store::MemoryStore;

    fn saved(
        slug: &str,
        second: u32,
    ) -> SavedResult {
        SavedResult {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            inputs: Default::default(),
            outputs: Default::default(),
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, second).unwrap(),
        }
    }

    #[tokio::test]
    async fn most_recent_first_and_truncated() {
        let history = ResultHistory::new(Box::new(MemoryStore::new()));
        let policy = HistoryPolicy::new("saved-results:test", 3);

        for second in 0..5 {
            history.save(&policy, saved("a", second)).await.unwrap();
        }

        let seconds: Vec<u32> = history
            .list(&policy)
            .await
            .unwrap()
            .iter()
            .map(|e| chrono::Timelike::second(&e.timestamp))
            .collect();
        assert_eq!(seconds, vec![4, 3, 2]);
    }

    #[tokio::test]
    async fn list_of_missing_key_is_empty() {
        let history = ResultHistory::new(Box::new(MemoryStore::new()));

        assert_eq!(
            history.list(&HistoryPolicy::new("nothing", 5)).await,
            Ok(Vec::new())
        );
    }

    #[tokio::test]
    async fn shared_key_filters_by_slug() {
        let history = ResultHistory::new(Box::new(MemoryStore::new()));
        let policy = HistoryPolicy::new("saved-results:shared", 10);

        history.save(&policy, saved("a", 1)).await.unwrap();
        history.save(&policy, saved("b", 2)).await.unwrap();
        history.save(&policy, saved("a", 3)).await.unwrap();

        assert_eq!(history.list(&policy).await.unwrap().len(), 3);
        assert_eq!(history.list_for(&policy, "a").await.unwrap().len(), 2);
        assert_eq!(history.list_for(&policy, "b").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unreadable_entries_are_skipped_but_preserved() {
        let store = MemoryStore::new();
        store
            .set("saved-results:x", r#"[42, {"slug":"a"}, "junk"]"#)
            .await
            .unwrap();
        let history = ResultHistory::new(Box::new(store));
        let policy = HistoryPolicy::new("saved-results:x", 10);

        assert_eq!(history.list(&policy).await.unwrap().len(), 1);

        history.save(&policy, saved("b", 0)).await.unwrap();
        let raw = history.raw_entries(&policy.key).await.unwrap();
        assert_eq!(raw.len(), 4);
        assert_eq!(raw[1], serde_json::json!(42));
    }

    #[tokio::test]
    async fn corrupted_value_is_not_overwritten() {
        let store = MemoryStore::new();
        store.set("saved-results:x", "{not json").await.unwrap();
        let history = ResultHistory::new(Box::new(store));
        let policy = HistoryPolicy::new("saved-results:x", 10);

        let err = history.save(&policy, saved("a", 0)).await.unwrap_err();

        assert!(matches!(err, HistoryError::Corrupted { .. }));
        assert!(history.list(&policy).await.is_err());
        history.clear(&policy).await.unwrap();
        assert_eq!(history.list(&policy).await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn clearing_an_empty_history_succeeds() {
        let history = ResultHistory::new(Box::new(MemoryStore::new()));
        let policy = HistoryPolicy::new("saved-results:x", 10);

        assert_eq!(history.clear(&policy).await, Ok(()));
    }

    #[tokio::test]
    async fn store_failures_are_reported() {
        let history = ResultHistory::new(Box::new(MemoryStore::with_quota(16)));
        let policy = HistoryPolicy::new("saved-results:x", 10);

        let err = history.save(&policy, saved("a", 0)).await.unwrap_err();

        assert!(matches!(
            err,
            HistoryError::Store(StoreError::QuotaExceeded { .. })
        ));
        assert_eq!(history.list(&policy).await, Ok(Vec::new()));
    }
}
