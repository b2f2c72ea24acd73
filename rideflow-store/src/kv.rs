use async_trait::async_trait;
use rideflow_core::{KeyValueStore, StorageError};
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().await.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// All keys in one JSON document on disk.
///
/// Writes go to a sibling temp file that is renamed over the original, so a crash
/// mid-write leaves the previous document intact.
pub struct FileKeyValueStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the document
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_document(&self, key: &str) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StorageError::read(key, e)),
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            key: key.to_string(),
            reason: format!("{}: {}", self.path.display(), e),
        })
    }

    async fn write_document(
        &self,
        key: &str,
        document: &BTreeMap<String, String>,
    ) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StorageError::write(key, e))?;
            }
        }

        let body = serde_json::to_string_pretty(document).map_err(|e| StorageError::write(key, e))?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| StorageError::write(key, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::write(key, e))?;

        debug!("Session document written to {}", self.path.display());
        Ok(())
    }

    /// Like `read_document`, but a corrupt document starts over empty. The flag
    /// tells the caller the file must be rewritten even if nothing changed.
    async fn read_for_update(
        &self,
        key: &str,
    ) -> Result<(BTreeMap<String, String>, bool), StorageError> {
        match self.read_document(key).await {
            Ok(document) => Ok((document, false)),
            Err(StorageError::Corrupt { reason, .. }) => {
                warn!("Discarding corrupt session document: {}", reason);
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        let document = self.read_document(key).await?;
        Ok(document.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let (mut document, _) = self.read_for_update(key).await?;
        document.insert(key.to_string(), value.to_string());
        self.write_document(key, &document).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let (mut document, discarded) = self.read_for_update(key).await?;
        if document.remove(key).is_none() && !discarded {
            return Ok(());
        }
        self.write_document(key, &document).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryKeyValueStore::new();
        assert_eq!(store.get("auth_token").await.unwrap(), None);

        store.set("auth_token", "abc").await.unwrap();
        assert_eq!(store.get("auth_token").await.unwrap().as_deref(), Some("abc"));

        store.remove("auth_token").await.unwrap();
        store.remove("auth_token").await.unwrap();
        assert_eq!(store.get("auth_token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileKeyValueStore::new(&path);
        store.set("auth_token", "abc").await.unwrap();
        store.set("user_profile", r#"{"name":"Asha"}"#).await.unwrap();
        store.remove("auth_token").await.unwrap();
        drop(store);

        let reopened = FileKeyValueStore::new(&path);
        assert_eq!(reopened.get("auth_token").await.unwrap(), None);
        assert_eq!(
            reopened.get("user_profile").await.unwrap().as_deref(),
            Some(r#"{"name":"Asha"}"#)
        );
    }

    #[tokio::test]
    async fn test_file_store_reports_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = FileKeyValueStore::new(&path);
        let err = store.get("auth_token").await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_write_replaces_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = FileKeyValueStore::new(&path);
        store.set("auth_token", "fresh").await.unwrap();
        assert_eq!(store.get("auth_token").await.unwrap().as_deref(), Some("fresh"));

        tokio::fs::write(&path, "{not json").await.unwrap();
        store.remove("auth_token").await.unwrap();
        assert_eq!(store.get("auth_token").await.unwrap(), None);
    }
}
