//! Tool dispatch
//!
//! Executes model-issued tool calls against an implementation map. Each call
//! yields exactly one tool message, in call order; per-call failures are
//! reported in-band so the conversation can continue.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::join_all;
use futures::FutureExt;
use serde_json::json;

use super::error::{ToolError, ToolResult};
use super::registry::ImplementationMap;
use crate::logging::Logger;
use crate::types::{Message, ToolCall};

/// Content of a tool message reporting a failure
pub fn error_content(message: &str) -> String {
    json!({ "error": message }).to_string()
}

/// Execute `calls` concurrently and collect one tool message per call
///
/// Fails only when `calls` is empty.
pub async fn dispatch(
    calls: &[ToolCall],
    implementations: &ImplementationMap,
    logger: &Arc<dyn Logger>,
) -> ToolResult<Vec<Message>> {
    if calls.is_empty() {
        return Err(ToolError::EmptyCalls);
    }

    logger.info(&format!("[Dispatcher] Executing {} tool call(s)", calls.len()));
    let futures = calls
        .iter()
        .map(|call| execute_call(call, implementations, logger.as_ref()));
    Ok(join_all(futures).await)
}

async fn execute_call(call: &ToolCall, implementations: &ImplementationMap, logger: &dyn Logger) -> Message {
    let content = match run(call, implementations).await {
        Ok(content) => {
            logger.debug(&format!("[Dispatcher] {} ({}) succeeded", call.name, call.id));
            content
        }
        Err(message) => {
            logger.warn(&format!(
                "[Dispatcher] {} ({}) failed: {}",
                call.name, call.id, message
            ));
            error_content(&message)
        }
    };
    Message::tool(call.id.clone(), content)
}

async fn run(call: &ToolCall, implementations: &ImplementationMap) -> Result<String, String> {
    let implementation = implementations
        .get(&call.name)
        .ok_or_else(|| format!("Tool '{}' not found", call.name))?;

    let arguments = call
        .parse_arguments()
        .map_err(|e| format!("Invalid arguments for '{}': {}", call.name, e))?;

    // A panicking implementation fails only its own call
    let output = AssertUnwindSafe(implementation.invoke(arguments))
        .catch_unwind()
        .await
        .map_err(|_| format!("Tool '{}' panicked", call.name))?
        .map_err(|e| format!("Tool '{}' failed: {}", call.name, e))?
        .ok_or_else(|| format!("Tool '{}' returned no result", call.name))?;

    serde_json::to_string(&output).map_err(|e| format!("Cannot serialize result of '{}': {}", call.name, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::tools::handler::{sync_tool_fn, tool_fn};
    use crate::types::MessageRole;
    use serde_json::Value;
    use std::time::Duration;

    fn test_logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    fn implementations() -> ImplementationMap {
        let mut map = ImplementationMap::new();
        map.insert(
            "add".into(),
            sync_tool_fn(|args| {
                let a = args["a"].as_i64().unwrap_or(0);
                let b = args["b"].as_i64().unwrap_or(0);
                Ok(Some(json!(a + b)))
            }),
        );
        map.insert("void".into(), sync_tool_fn(|_| Ok(None)));
        map.insert("boom".into(), sync_tool_fn(|_| Err("exploded".into())));
        map.insert(
            "panics".into(),
            sync_tool_fn(|_| {
                let empty: Vec<i64> = Vec::new();
                Ok(Some(json!(empty[0])))
            }),
        );
        map.insert(
            "slow".into(),
            tool_fn(|_| async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(Some(json!("slow done")))
            }),
        );
        map
    }

    fn error_of(message: &Message) -> Option<String> {
        serde_json::from_str::<Value>(&message.content)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
    }

    #[tokio::test]
    async fn test_empty_calls_rejected() {
        let err = dispatch(&[], &implementations(), &test_logger()).await.unwrap_err();
        assert!(matches!(err, ToolError::EmptyCalls));
    }

    #[tokio::test]
    async fn test_success_content_is_serialized_result() {
        let calls = vec![ToolCall::new("c1", "add", r#"{"a": 2, "b": 40}"#)];
        let messages = dispatch(&calls, &implementations(), &test_logger()).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::Tool);
        assert_eq!(messages[0].tool_call_id.as_deref(), Some("c1"));
        assert_eq!(messages[0].content, "42");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_isolated() {
        let calls = vec![
            ToolCall::new("c1", "add", r#"{"a": 1, "b": 1}"#),
            ToolCall::new("c2", "nope", "{}"),
            ToolCall::new("c3", "add", r#"{"a": 2, "b": 2}"#),
        ];
        let messages = dispatch(&calls, &implementations(), &test_logger()).await.unwrap();

        let ids: Vec<_> = messages.iter().map(|m| m.tool_call_id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);

        let errors: Vec<_> = messages.iter().map(error_of).collect();
        assert!(errors[0].is_none());
        assert!(errors[1].as_deref().unwrap().contains("not found"));
        assert!(errors[2].is_none());
    }

    #[tokio::test]
    async fn test_per_call_faults_become_messages() {
        let calls = vec![
            ToolCall::new("c1", "add", "{broken"),
            ToolCall::new("c2", "void", "{}"),
            ToolCall::new("c3", "boom", "{}"),
        ];
        let messages = dispatch(&calls, &implementations(), &test_logger()).await.unwrap();

        assert!(error_of(&messages[0]).unwrap().contains("Invalid arguments"));
        assert!(error_of(&messages[1]).unwrap().contains("no result"));
        assert!(error_of(&messages[2]).unwrap().contains("exploded"));
    }

    #[tokio::test]
    async fn test_order_preserved_regardless_of_completion() {
        let calls = vec![
            ToolCall::new("first", "slow", "{}"),
            ToolCall::new("second", "add", r#"{"a": 1, "b": 2}"#),
        ];
        let messages = dispatch(&calls, &implementations(), &test_logger()).await.unwrap();
        assert_eq!(messages[0].tool_call_id.as_deref(), Some("first"));
        assert_eq!(messages[0].content, "\"slow done\"");
        assert_eq!(messages[1].tool_call_id.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_panicking_tool_is_isolated() {
        let calls = vec![
            ToolCall::new("c1", "add", r#"{"a": 3, "b": 4}"#),
            ToolCall::new("c2", "panics", "{}"),
        ];
        let messages = dispatch(&calls, &implementations(), &test_logger()).await.unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].tool_call_id.as_deref(), Some("c1"));
        assert_eq!(messages[0].content, "7");
        assert_eq!(messages[1].tool_call_id.as_deref(), Some("c2"));
        assert_eq!(error_of(&messages[1]).as_deref(), Some("Tool 'panics' panicked"));
    }
}
