//! JSON file storage engine.
//!
//! The whole keyspace lives in one pretty-printed JSON object, rewritten on
//! every mutation through a temporary file and a rename. Values must be JSON
//! documents, which every record in this workspace is. A mutation becomes
//! visible to readers only once it is on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::backend::{list_children, Storage};
use crate::error::{Result, StorageError};

#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Value>>,
}

impl JsonFileStorage {
    /// Open `path`, starting empty if it does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StorageError::Decode {
                key: path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        debug!(path = %path.display(), entries = entries.len(), "opened store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &BTreeMap<String, Value>) -> Result<()> {
        let body = serde_json::to_vec_pretty(entries).map_err(|source| StorageError::Encode {
            key: self.path.display().to_string(),
            source,
        })?;

        let tmp = self.path.with_extension("tmp");
        let io_err = |source: std::io::Error| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(&tmp, body).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;
        Ok(())
    }
}

#[async_trait]
impl Storage for JsonFileStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .map(|value| {
                serde_json::to_vec(value).map_err(|source| StorageError::Encode {
                    key: key.to_string(),
                    source,
                })
            })
            .transpose()
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let value: Value = serde_json::from_slice(&value).map_err(|source| StorageError::Decode {
            key: key.to_string(),
            source,
        })?;

        let mut entries = self.entries.lock().await;
        let mut staged = entries.clone();
        staged.insert(key.to_string(), value);
        self.persist(&staged).await?;
        *entries = staged;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut staged = entries.clone();
        staged.remove(key);
        self.persist(&staged).await?;
        *entries = staged;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = self.entries.lock().await;
        Ok(list_children(entries.keys(), prefix))
    }

    fn name(&self) -> &'static str {
        "JsonFileStorage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reopen_sees_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let storage = JsonFileStorage::open(&path).await.unwrap();
        storage.put("groups/a", br#"{"name":"a"}"#.to_vec()).await.unwrap();
        storage.put("groups/b", br#"{"name":"b"}"#.to_vec()).await.unwrap();
        storage.delete("groups/b").await.unwrap();

        let reopened = JsonFileStorage::open(&path).await.unwrap();
        assert_eq!(reopened.list("groups/").await.unwrap(), vec!["a"]);

        let body = reopened.get("groups/a").await.unwrap().unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["name"], "a");
    }

    #[tokio::test]
    async fn test_rejects_non_json_values() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::open(dir.path().join("s.json")).await.unwrap();

        let err = storage.put("k", b"not json".to_vec()).await.unwrap_err();
        assert!(matches!(err, StorageError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_failed_persist_leaves_entries_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let storage = JsonFileStorage::open(&path).await.unwrap();
        storage.put("groups/a", br#"{"name":"a"}"#.to_vec()).await.unwrap();

        // A non-empty directory in place of the file makes the rename fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("blocker"), b"x").unwrap();

        let err = storage.put("groups/b", br#"{"name":"b"}"#.to_vec()).await.unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
        assert_eq!(storage.get("groups/b").await.unwrap(), None);

        let err = storage.delete("groups/a").await.unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
        assert!(storage.get("groups/a").await.unwrap().is_some());
        assert_eq!(storage.list("groups/").await.unwrap(), vec!["a"]);
    }
}
