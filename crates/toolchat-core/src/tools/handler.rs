//! Tool implementation trait and closure adapters

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::error::ToolInvokeError;

/// Outcome of a tool invocation; `Ok(None)` means the tool produced no result
pub type ToolOutcome = Result<Option<Value>, ToolInvokeError>;

/// Callable side of a tool
///
/// Receives the parsed argument object and returns the value that is
/// serialized into the tool message.
#[async_trait]
pub trait ToolImplementation: Send + Sync {
    async fn invoke(&self, arguments: Value) -> ToolOutcome;
}

/// Tool backed by an async closure
pub struct FnTool<F> {
    handler: F,
}

#[async_trait]
impl<F, Fut> ToolImplementation for FnTool<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = ToolOutcome> + Send,
{
    async fn invoke(&self, arguments: Value) -> ToolOutcome {
        (self.handler)(arguments).await
    }
}

/// Tool backed by a plain closure
pub struct SyncFnTool<F> {
    handler: F,
}

#[async_trait]
impl<F> ToolImplementation for SyncFnTool<F>
where
    F: Fn(Value) -> ToolOutcome + Send + Sync,
{
    async fn invoke(&self, arguments: Value) -> ToolOutcome {
        (self.handler)(arguments)
    }
}

/// Wrap an async closure as a shared tool implementation
pub fn tool_fn<F, Fut>(handler: F) -> Arc<dyn ToolImplementation>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ToolOutcome> + Send + 'static,
{
    Arc::new(FnTool { handler })
}

/// Wrap a plain closure as a shared tool implementation
pub fn sync_tool_fn<F>(handler: F) -> Arc<dyn ToolImplementation>
where
    F: Fn(Value) -> ToolOutcome + Send + Sync + 'static,
{
    Arc::new(SyncFnTool { handler })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn add_numbers(args: &Value) -> ToolOutcome {
        let a = args["a"].as_i64().ok_or("a must be an integer")?;
        let b = args["b"].as_i64().ok_or("b must be an integer")?;
        Ok(Some(json!(a + b)))
    }

    #[tokio::test]
    async fn test_async_closure() {
        let add = tool_fn(|args: Value| async move { add_numbers(&args) });
        assert_eq!(add.invoke(json!({ "a": 2, "b": 3 })).await, Ok(Some(json!(5))));
        assert_eq!(
            add.invoke(json!({ "a": 2 })).await,
            Err(ToolInvokeError::new("b must be an integer"))
        );
    }

    #[tokio::test]
    async fn test_sync_closure() {
        let nothing = sync_tool_fn(|_| Ok(None));
        assert_eq!(nothing.invoke(json!({})).await, Ok(None));
    }
}
