//! In-memory store doubles for tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use super::{Blob, BlobStore, KvStore, StorageError};

#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .write()
            .unwrap()
            .insert(key.into(), value.into());
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Blob>>,
}

impl MemoryBlobStore {
    pub fn insert(&self, path: impl Into<String>, bytes: impl Into<Bytes>) {
        self.blobs.write().unwrap().insert(
            path.into(),
            Blob {
                bytes: bytes.into(),
                content_type: None,
            },
        );
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn read(&self, path: &str) -> Result<Option<Blob>, StorageError> {
        Ok(self.blobs.read().unwrap().get(path).cloned())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// A key-value store whose every call fails, for exercising error paths.
pub struct FailingKvStore;

#[async_trait]
impl KvStore for FailingKvStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Blob("connection refused".to_string()))
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Err(StorageError::Blob("connection refused".to_string()))
    }
}

/// Serves stored records but fails every `session:*` lookup.
#[derive(Default)]
pub struct SessionOutageKvStore {
    pub inner: MemoryKvStore,
}

#[async_trait]
impl KvStore for SessionOutageKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if key.starts_with("session:") {
            return Err(StorageError::Blob("session backend timed out".to_string()));
        }
        self.inner.get(key).await
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
