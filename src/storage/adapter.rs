//! Storage backends
//!
//! A [`StorageAdapter`] is the external half of the persistence story: it
//! moves raw JSON payloads in and out of some durable place (a file, a
//! browser storage area, a test map) and knows nothing about the typed value
//! living in a [`StorageHelper`](crate::storage::StorageHelper). Payloads
//! stay `serde_json::Value` at this seam so migrations can rewrite them
//! before they are deserialized.

use crate::storage::error::StorageResult;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Generic async key/value backend for persisted stores
///
/// Implementations may answer from memory or from real I/O; callers treat
/// both the same way. `get_item` returns `Ok(None)` when nothing has been
/// stored under the key yet.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Fetch the raw payload stored under `key`
    async fn get_item(&self, key: &str) -> StorageResult<Option<Value>>;

    /// Persist `value` under `key`, replacing any previous payload
    async fn set_item(&self, key: &str, value: Value) -> StorageResult<()>;

    /// Delete the payload stored under `key`; deleting a missing key is not
    /// an error
    async fn remove_item(&self, key: &str) -> StorageResult<()>;
}

// Shared backends can be handed to several stores.
#[async_trait]
impl<S: StorageAdapter + ?Sized> StorageAdapter for Arc<S> {
    async fn get_item(&self, key: &str) -> StorageResult<Option<Value>> {
        (**self).get_item(key).await
    }

    async fn set_item(&self, key: &str, value: Value) -> StorageResult<()> {
        (**self).set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        (**self).remove_item(key).await
    }
}

/// In-memory adapter, mainly for tests and ephemeral state
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the payload currently stored under `key`
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.items.lock().ok()?.get(key).cloned()
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn get_item(&self, key: &str) -> StorageResult<Option<Value>> {
        let items = self
            .items
            .lock()
            .map_err(|_| crate::storage::StorageError::Backend("poisoned lock".into()))?;
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: Value) -> StorageResult<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| crate::storage::StorageError::Backend("poisoned lock".into()))?;
        items.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| crate::storage::StorageError::Backend("poisoned lock".into()))?;
        items.remove(key);
        Ok(())
    }
}

/// File-backed adapter: one pretty-printed JSON file per key
///
/// Keys map to `<base_dir>/<key>.json`. The base directory is created on
/// first write. A missing file reads as `Ok(None)`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl StorageAdapter for FileStorage {
    async fn get_item(&self, key: &str) -> StorageResult<Option<Value>> {
        let path = self.item_path(key);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let value = serde_json::from_str(&content)?;
        Ok(Some(value))
    }

    async fn set_item(&self, key: &str, value: Value) -> StorageResult<()> {
        tokio::fs::create_dir_all(&self.base_dir).await?;
        let content = serde_json::to_string_pretty(&value)?;
        tokio::fs::write(self.item_path(key), content).await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        match tokio::fs::remove_file(self.item_path(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
