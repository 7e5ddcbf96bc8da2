//! Key-value storage backends.
//!
//! The device storage the cart persists to is modeled as an external
//! collaborator behind [`KeyValueStorage`]: string keys, string values,
//! no transactions. The store is the single writer for its key.
//!
//! Two backends ship with the crate:
//!
//! - [`MemoryStorage`] - process-local map; ephemeral sessions and tests
//! - [`FileStorage`] - one file per key under a data directory

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::StorageError;

/// An external key-value store: `get` returns the stored string for a key
/// if one exists, `set` replaces it, `remove` deletes it.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, or `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write does not complete.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage backend.
///
/// Values live in a process-local map and vanish with the process. Used as
/// the test double and for sessions that opt out of persistence.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // Lock poisoning cannot corrupt a plain map of strings.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// File-backed storage: each key maps to `<data_dir>/<key>.json`.
///
/// Writes go through a temp file and a rename so a crash mid-write leaves
/// either the old snapshot or the new one, never a torn file. Keys become
/// file stems under the data directory; callers must pass plain names
/// like [`crate::snapshot::CART_KEY`], never path-like strings - anything
/// accepting a key from the outside has to validate it first.
#[derive(Debug, Clone)]
pub struct FileStorage {
    data_dir: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `data_dir`. The directory is
    /// created lazily on first write.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("cart").await.unwrap(), None);

        storage.set("cart", "[]").await.unwrap();
        assert_eq!(storage.get("cart").await.unwrap().as_deref(), Some("[]"));

        storage.set("cart", "[1]").await.unwrap();
        assert_eq!(storage.get("cart").await.unwrap().as_deref(), Some("[1]"));

        storage.remove("cart").await.unwrap();
        assert_eq!(storage.get("cart").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_storage_remove_absent_key_is_ok() {
        let storage = MemoryStorage::new();
        storage.remove("nothing").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_storage_round_trip() {
        let dir = std::env::temp_dir().join(format!("pocket-cart-test-{}", std::process::id()));
        let storage = FileStorage::new(&dir);

        assert_eq!(storage.get("cart").await.unwrap(), None);

        storage.set("cart", "{\"a\":1}").await.unwrap();
        assert_eq!(
            storage.get("cart").await.unwrap().as_deref(),
            Some("{\"a\":1}")
        );

        storage.remove("cart").await.unwrap();
        assert_eq!(storage.get("cart").await.unwrap(), None);
        storage.remove("cart").await.unwrap();

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_storage_overwrite_replaces_contents() {
        let dir = std::env::temp_dir().join(format!(
            "pocket-cart-test-overwrite-{}",
            std::process::id()
        ));
        let storage = FileStorage::new(&dir);

        storage.set("cart", "first").await.unwrap();
        storage.set("cart", "second").await.unwrap();
        assert_eq!(
            storage.get("cart").await.unwrap().as_deref(),
            Some("second")
        );

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
