//! In-memory storage engine.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::backend::{list_children, Storage};
use crate::error::Result;

/// `BTreeMap` backed engine; listing order falls out of the map order.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// All keys currently stored (for tests and debugging).
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(list_children(self.entries.read().keys(), prefix))
    }

    fn name(&self) -> &'static str {
        "InMemoryStorage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let storage = InMemoryStorage::new();
        assert!(storage.get("a").await.unwrap().is_none());

        storage.put("a", b"1".to_vec()).await.unwrap();
        assert_eq!(storage.get("a").await.unwrap(), Some(b"1".to_vec()));

        storage.delete("a").await.unwrap();
        storage.delete("a").await.unwrap();
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let storage = InMemoryStorage::new();
        for key in ["g/peer3", "g/peer1", "g/peer2"] {
            storage.put(key, Vec::new()).await.unwrap();
        }
        assert_eq!(storage.list("g/").await.unwrap(), vec!["peer1", "peer2", "peer3"]);
    }
}
