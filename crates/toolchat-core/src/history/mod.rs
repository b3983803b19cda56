//! Conversation history
//!
//! - `ListStore`: ordered list storage (push-front, range read, delete)
//! - `MemoryListStore` / `RedisListStore`: storage backends
//! - `HistoryStore`: per-user message log with bounded, filtered reads

mod conversation;
mod error;
mod memory;
mod redis_store;
mod store;

pub use conversation::{HistoryConfig, HistoryStore, ReadOptions};
pub use error::{HistoryError, HistoryResult};
pub use memory::MemoryListStore;
pub use redis_store::RedisListStore;
pub use store::ListStore;
