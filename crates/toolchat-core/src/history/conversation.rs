//! Per-user conversation history
//!
//! Messages are stored most-recent-first under `user:<id>` and returned in
//! chronological order.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::HistoryResult;
use super::store::ListStore;
use crate::logging::Logger;
use crate::types::{Message, MessageRole};

/// Options for a single history read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadOptions {
    /// Most recent entries to return; `Some(0)` returns nothing, `None` everything
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Keep only user messages and assistant messages without tool calls
    #[serde(default)]
    pub exclude_tool_messages: bool,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn excluding_tool_messages(mut self) -> Self {
        self.exclude_tool_messages = true;
        self
    }
}

/// Defaults applied by a `HistoryStore`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Options used when a read does not pass its own
    #[serde(default)]
    pub default_read: ReadOptions,
}

/// Append-only message log per user
#[derive(Clone)]
pub struct HistoryStore {
    store: Arc<dyn ListStore>,
    config: HistoryConfig,
    logger: Arc<dyn Logger>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn ListStore>, config: HistoryConfig, logger: Arc<dyn Logger>) -> Self {
        Self { store, config, logger }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Store key for a user
    pub fn key(user_id: &str) -> String {
        format!("user:{user_id}")
    }

    /// Append messages in order, dropping a leading system message
    pub async fn append(&self, user_id: &str, messages: &[Message]) -> HistoryResult<()> {
        let messages = match messages.first() {
            Some(first) if first.role == MessageRole::System => &messages[1..],
            _ => messages,
        };
        if messages.is_empty() {
            return Ok(());
        }

        let encoded = messages
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;

        self.store.push_front(&Self::key(user_id), encoded).await?;
        self.logger.debug(&format!(
            "[History] Appended {} message(s) for {}",
            messages.len(),
            user_id
        ));
        Ok(())
    }

    /// Read a user's log in chronological order
    pub async fn read(&self, user_id: &str, options: Option<&ReadOptions>) -> HistoryResult<Vec<Message>> {
        let options = options.unwrap_or(&self.config.default_read);
        let stop = match options.limit {
            Some(0) => return Ok(Vec::new()),
            Some(limit) => isize::try_from(limit).map_or(-1, |l| l - 1),
            None => -1,
        };

        let entries = self.store.range(&Self::key(user_id), 0, stop).await?;
        let mut messages = entries
            .iter()
            .rev()
            .map(|entry| serde_json::from_str::<Message>(entry))
            .collect::<Result<Vec<_>, _>>()?;

        if options.exclude_tool_messages {
            messages.retain(|m| match m.role {
                MessageRole::User => true,
                MessageRole::Assistant => !m.has_tool_calls(),
                MessageRole::System | MessageRole::Tool => false,
            });
        }
        Ok(messages)
    }

    /// Delete a user's log, returning how many messages it held
    pub async fn purge(&self, user_id: &str) -> HistoryResult<usize> {
        let removed = self.store.delete(&Self::key(user_id)).await?;
        self.logger.info(&format!(
            "[History] Purged {} message(s) for {}",
            removed, user_id
        ));
        Ok(removed)
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryListStore;
    use crate::logging::NoOpLogger;
    use crate::types::ToolCall;

    fn history() -> (HistoryStore, Arc<MemoryListStore>) {
        let store = Arc::new(MemoryListStore::new());
        let history = HistoryStore::new(
            store.clone(),
            HistoryConfig::default(),
            Arc::new(NoOpLogger::new()),
        );
        (history, store)
    }

    fn numbered(n: usize) -> Vec<Message> {
        (1..=n).map(|i| Message::user(format!("m{i}"))).collect()
    }

    fn contents(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.content.as_str()).collect()
    }

    #[tokio::test]
    async fn test_append_drops_leading_system() {
        let (history, store) = history();
        let batch = vec![
            Message::system("be brief"),
            Message::user("m1"),
            Message::assistant("m2"),
        ];
        history.append("u1", &batch).await.unwrap();

        assert_eq!(store.len("user:u1"), 2);
        let read = history.read("u1", None).await.unwrap();
        assert_eq!(read, batch[1..].to_vec());
    }

    #[tokio::test]
    async fn test_read_limits() {
        let (history, _) = history();
        history.append("u1", &numbered(3)).await.unwrap();
        history.append("u1", &numbered(5)[3..]).await.unwrap();

        let all = history.read("u1", None).await.unwrap();
        assert_eq!(contents(&all), vec!["m1", "m2", "m3", "m4", "m5"]);

        let last_two = history.read("u1", Some(&ReadOptions::new().with_limit(2))).await.unwrap();
        assert_eq!(contents(&last_two), vec!["m4", "m5"]);

        let none = history.read("u1", Some(&ReadOptions::new().with_limit(0))).await.unwrap();
        assert!(none.is_empty());

        let more = history.read("u1", Some(&ReadOptions::new().with_limit(50))).await.unwrap();
        assert_eq!(more.len(), 5);
    }

    #[tokio::test]
    async fn test_exclude_tool_messages() {
        let (history, _) = history();
        let turn = vec![
            Message::user("weather?"),
            Message::assistant_with_tool_calls("", vec![ToolCall::new("c1", "get_weather", "{}")]),
            Message::tool("c1", "\"sunny\""),
            Message::assistant("It is sunny."),
        ];
        history.append("u1", &turn).await.unwrap();

        let clean = history
            .read("u1", Some(&ReadOptions::new().excluding_tool_messages()))
            .await
            .unwrap();
        assert_eq!(contents(&clean), vec!["weather?", "It is sunny."]);
        assert!(clean.iter().all(|m| !m.is_tool_message() && !m.has_tool_calls()));
    }

    #[tokio::test]
    async fn test_default_read_options_apply() {
        let store = Arc::new(MemoryListStore::new());
        let config = HistoryConfig {
            default_read: ReadOptions::new().with_limit(1),
        };
        let history = HistoryStore::new(store, config, Arc::new(NoOpLogger::new()));
        history.append("u1", &numbered(3)).await.unwrap();

        let read = history.read("u1", None).await.unwrap();
        assert_eq!(contents(&read), vec!["m3"]);
    }

    #[tokio::test]
    async fn test_purge_is_idempotent() {
        let (history, _) = history();
        history.append("u1", &numbered(5)).await.unwrap();
        assert_eq!(history.purge("u1").await.unwrap(), 5);
        assert_eq!(history.purge("u1").await.unwrap(), 0);
        assert!(history.read("u1", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let (history, _) = history();
        history.append("u1", &numbered(2)).await.unwrap();
        history.append("u2", &numbered(1)).await.unwrap();
        assert_eq!(history.purge("u2").await.unwrap(), 1);
        assert_eq!(history.read("u1", None).await.unwrap().len(), 2);
    }
}
