//! Storage seams consumed by the review page.
//!
//! Two capabilities, both read-only from this service's point of view:
//! a key-value store holding JSON records and session markers, and a blob
//! store holding the uploaded PDFs and their preview images.

pub mod fs;
#[cfg(test)]
pub mod memory;
pub mod redis_kv;
pub mod s3;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("key-value store error: {0}")]
    Kv(#[from] redis::RedisError),

    #[error("blob store error: {0}")]
    Blob(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid blob path: {0}")]
    InvalidPath(String),
}

/// A binary object read from the blob store.
#[derive(Debug, Clone)]
pub struct Blob {
    pub bytes: Bytes,
    /// Content type reported by the backend, if it tracks one.
    pub content_type: Option<String>,
}

#[async_trait]
pub trait KvStore: Send + Sync {
    /// Returns the value under `key`, or `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Cheap liveness check used by the readiness task.
    async fn ping(&self) -> Result<(), StorageError>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns the blob at `path`, or `None` if nothing is stored there.
    async fn read(&self, path: &str) -> Result<Option<Blob>, StorageError>;

    async fn ping(&self) -> Result<(), StorageError>;
}

/// Both stores plus the readiness flag the page gates on.
#[derive(Clone)]
pub struct Storage {
    kv: Arc<dyn KvStore>,
    blobs: Arc<dyn BlobStore>,
    ready: Arc<AtomicBool>,
}

impl Storage {
    pub fn new(kv: Arc<dyn KvStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            kv,
            blobs,
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn kv(&self) -> &dyn KvStore {
        self.kv.as_ref()
    }

    pub fn blobs(&self) -> &dyn BlobStore {
        self.blobs.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Pings both stores until they answer, then flips the readiness flag.
    /// Runs forever at `interval` while either ping fails.
    pub async fn wait_until_ready(self, interval: Duration) {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.ping_all().await {
                Ok(()) => {
                    self.mark_ready();
                    info!("Storage ready after {attempt} attempt(s)");
                    return;
                }
                Err(e) => {
                    warn!(
                        "Storage check {attempt} failed: {e}; retrying in {}ms",
                        interval.as_millis()
                    );
                    tokio::time::sleep(interval).await;
                }
            }
        }
    }

    async fn ping_all(&self) -> Result<(), StorageError> {
        self.kv.ping().await?;
        self.blobs.ping().await
    }
}

/// Normalises a stored blob path into a relative object key.
/// Records carry absolute-looking paths such as `/uploads/cv.pdf`.
pub fn object_key(path: &str) -> Result<&str, StorageError> {
    let key = path.trim().trim_start_matches('/');
    if key.is_empty() {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(key)
}
