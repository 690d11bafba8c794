//! Key/value persistence abstract Trait

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreResult;

/// String key/value store holding JSON documents.
///
/// Keys are scoped per user by [`SessionContext`](crate::SessionContext),
/// e.g. `personas_<userId>`.
///
/// Platform implementation:
/// - `FileKeyValueStore` (JSON file)
/// - `SqliteKeyValueStore` (`SeaORM`)
/// - [`MemoryKeyValueStore`] (tests, ephemeral sessions)
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    ///
    /// # Arguments
    /// * `key` - Storage key
    async fn get(&self, key: &str) -> CoreResult<Option<String>>;

    /// Write a value, replacing any previous one
    ///
    /// # Arguments
    /// * `key` - Storage key
    /// * `value` - JSON document
    async fn set(&self, key: &str, value: String) -> CoreResult<()>;

    /// Remove a value; removing a missing key is not an error
    async fn remove(&self, key: &str) -> CoreResult<()>;

    /// Persist buffered writes. Stores that write through need not override.
    async fn flush(&self) -> CoreResult<()> {
        Ok(())
    }
}

/// In-memory key/value store
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> CoreResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> CoreResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let store = MemoryKeyValueStore::new();
        assert!(store.is_empty().await);

        store.set("personas_u1", "[]".to_string()).await.unwrap();
        assert_eq!(store.get("personas_u1").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(store.len().await, 1);

        store.remove("personas_u1").await.unwrap();
        assert!(store.get("personas_u1").await.unwrap().is_none());
        // Removing again is fine
        store.remove("personas_u1").await.unwrap();
        store.flush().await.unwrap();
    }
}
