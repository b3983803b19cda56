//! Redis-backed list store

use async_trait::async_trait;
use redis::AsyncCommands;

use super::error::{HistoryError, HistoryResult};
use super::store::ListStore;

/// List store over Redis lists
///
/// Ordering between concurrent writers is whatever Redis serializes;
/// no additional locking is applied.
#[derive(Clone)]
pub struct RedisListStore {
    client: redis::Client,
}

impl RedisListStore {
    /// Create a store for the Redis instance at `url`
    pub fn new(url: &str) -> HistoryResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| HistoryError::store("connect", format!("failed to open Redis client: {e}")))?;
        Ok(Self { client })
    }

    async fn connection(&self) -> HistoryResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| HistoryError::store("connect", format!("failed to get connection: {e}")))
    }
}

impl std::fmt::Debug for RedisListStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisListStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl ListStore for RedisListStore {
    async fn push_front(&self, key: &str, values: Vec<String>) -> HistoryResult<()> {
        if values.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        let _: usize = conn
            .lpush(key, values)
            .await
            .map_err(|e| HistoryError::store("LPUSH", e.to_string()))?;
        Ok(())
    }

    async fn range(&self, key: &str, start: isize, stop: isize) -> HistoryResult<Vec<String>> {
        let mut conn = self.connection().await?;
        conn.lrange(key, start, stop)
            .await
            .map_err(|e| HistoryError::store("LRANGE", e.to_string()))
    }

    async fn delete(&self, key: &str) -> HistoryResult<usize> {
        let mut conn = self.connection().await?;
        let (removed,): (usize,) = redis::pipe()
            .atomic()
            .llen(key)
            .del(key)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| HistoryError::store("LLEN/DEL", e.to_string()))?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_rejected() {
        let err = RedisListStore::new("not-a-url").unwrap_err();
        assert!(matches!(err, HistoryError::Store { ref operation, .. } if operation == "connect"));
    }

    #[test]
    fn test_valid_url_does_not_connect_eagerly() {
        assert!(RedisListStore::new("redis://127.0.0.1:1/").is_ok());
    }
}
