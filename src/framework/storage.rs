//! Host storage boundary.
//!
//! The host owns durable (possibly seal-wrapped) storage; the backend only
//! sees this key/value interface.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::errors::{Error, Result};

/// A single record in host storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub key: String,
    pub value: Vec<u8>,
    /// Request seal-wrapping from the host for this record
    pub seal_wrap: bool,
}

impl StorageEntry {
    /// Encode `value` as JSON under `key`.
    pub fn json<T: Serialize>(key: impl Into<String>, value: &T) -> Result<Self> {
        let key = key.into();
        let value = serde_json::to_vec(value).map_err(|e| {
            Error::serialization(e, format!("Failed to encode storage entry '{}'", key))
        })?;
        Ok(Self { key, value, seal_wrap: false })
    }

    /// Mark this entry for seal-wrapping.
    pub fn sealed(mut self, seal_wrap: bool) -> Self {
        self.seal_wrap = seal_wrap;
        self
    }

    /// Decode the JSON payload.
    pub fn decode_json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.value).map_err(|e| {
            Error::serialization(e, format!("Failed to decode storage entry '{}'", self.key))
        })
    }
}

/// Key/value storage supplied by the host.
#[async_trait]
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Fetch an entry; `Ok(None)` when the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<StorageEntry>>;

    /// Insert or overwrite an entry.
    async fn put(&self, entry: StorageEntry) -> Result<()>;

    /// Remove an entry. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// In-process storage used by the stand-alone host adapter and tests.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    entries: RwLock<HashMap<String, StorageEntry>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<StorageEntry>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, entry: StorageEntry) -> Result<()> {
        self.entries.write().await.insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let storage = InMemoryStorage::new();
        let entry = StorageEntry::json("config/admin", &Record { name: "a".into() }).unwrap();
        storage.put(entry).await.unwrap();

        let fetched = storage.get("config/admin").await.unwrap().expect("entry present");
        assert_eq!(fetched.decode_json::<Record>().unwrap(), Record { name: "a".into() });

        storage.delete("config/admin").await.unwrap();
        assert!(storage.get("config/admin").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_ok() {
        let storage = InMemoryStorage::new();
        assert!(storage.delete("nope").await.is_ok());
    }

    #[test]
    fn test_decode_error_is_serialization() {
        let entry = StorageEntry { key: "k".into(), value: b"not json".to_vec(), seal_wrap: false };
        let err = entry.decode_json::<Record>().unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
    }

    #[test]
    fn test_sealed_flag() {
        let entry = StorageEntry::json("config/admin", &1).unwrap().sealed(true);
        assert!(entry.seal_wrap);
    }
}
