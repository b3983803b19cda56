//! Ordered list store abstraction

use async_trait::async_trait;

use super::error::HistoryResult;

/// Ordered list store keyed by string
///
/// Mirrors the subset of Redis list commands the history needs. Implementations:
/// - `MemoryListStore`: in-process, for tests and single-node use
/// - `RedisListStore`: Redis `LPUSH` / `LRANGE` / `DEL`
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Push `values` to the front of the list one by one, so the last value
    /// ends up first
    async fn push_front(&self, key: &str, values: Vec<String>) -> HistoryResult<()>;

    /// Entries `start..=stop`; negative indices count from the end (`-1` is last)
    async fn range(&self, key: &str, start: isize, stop: isize) -> HistoryResult<Vec<String>>;

    /// Remove the list, returning how many entries it held
    async fn delete(&self, key: &str) -> HistoryResult<usize>;
}
