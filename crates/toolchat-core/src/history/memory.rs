//! In-memory list store

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::HistoryResult;
use super::store::ListStore;

/// In-memory list store for testing and single-process use
#[derive(Debug, Default)]
pub struct MemoryListStore {
    lists: Mutex<HashMap<String, VecDeque<String>>>,
}

impl MemoryListStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries under `key`
    pub fn len(&self, key: &str) -> usize {
        self.lists.lock().get(key).map_or(0, VecDeque::len)
    }

    /// Number of keys held
    pub fn key_count(&self) -> usize {
        self.lists.lock().len()
    }
}

/// Resolve Redis-style inclusive indices against a list of `len` entries
fn bounds(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = isize::try_from(len).ok()?;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len || stop < 0 {
        return None;
    }
    Some((start as usize, stop as usize))
}

#[async_trait]
impl ListStore for MemoryListStore {
    async fn push_front(&self, key: &str, values: Vec<String>) -> HistoryResult<()> {
        let mut lists = self.lists.lock();
        let list = lists.entry(key.to_string()).or_default();
        for value in values {
            list.push_front(value);
        }
        Ok(())
    }

    async fn range(&self, key: &str, start: isize, stop: isize) -> HistoryResult<Vec<String>> {
        let lists = self.lists.lock();
        let Some(list) = lists.get(key) else {
            return Ok(Vec::new());
        };
        Ok(match bounds(list.len(), start, stop) {
            Some((start, stop)) => list.range(start..=stop).cloned().collect(),
            None => Vec::new(),
        })
    }

    async fn delete(&self, key: &str) -> HistoryResult<usize> {
        Ok(self.lists.lock().remove(key).map_or(0, |list| list.len()))
    }
}
