use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::OnceCell;

use super::{KvStore, StorageError};

/// Redis-backed key-value store holding resume records and session markers.
///
/// One multiplexed connection is opened on first use and shared by every
/// request. A failed connect is not cached, so the next call retries.
pub struct RedisKvStore {
    client: redis::Client,
    conn: OnceCell<MultiplexedConnection>,
}

impl RedisKvStore {
    pub fn open(redis_url: &str) -> Result<Self, StorageError> {
        Ok(Self {
            client: redis::Client::open(redis_url)?,
            conn: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, StorageError> {
        let conn = self
            .conn
            .get_or_try_init(|| self.client.get_multiplexed_async_connection())
            .await?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl KvStore for RedisKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }
}
