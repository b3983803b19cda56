//! Scripted provider for testing
//!
//! Provides deterministic, configurable responses without network dependencies.
//! Responses are replayed from a queue; once the queue is drained the provider
//! echoes the last user message.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::{ProviderError, ProviderResult};
use super::traits::CompletionProvider;
use crate::logging::Logger;
use crate::types::{
    CancellationToken, CompletionRequest, CompletionResponse, Message, MessageRole, ToolCall, Usage,
};

/// One scripted reaction
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Return this response
    Respond(CompletionResponse),
    /// Fail with this message
    Fail(String),
    /// Return a response without any candidate message
    Empty,
}

/// Scripted provider for tests
pub struct ScriptedProvider {
    script: Mutex<VecDeque<ScriptStep>>,
    requests: Mutex<Vec<CompletionRequest>>,
    delay: Option<Duration>,
    logger: Arc<dyn Logger>,
}

impl ScriptedProvider {
    /// Create an echo provider with an empty script
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            delay: None,
            logger,
        }
    }

    /// Queue a step
    pub fn then(self, step: ScriptStep) -> Self {
        self.script.lock().push_back(step);
        self
    }

    /// Queue a plain assistant reply
    pub fn then_reply(self, text: impl Into<String>, usage: Usage) -> Self {
        self.then(ScriptStep::Respond(
            CompletionResponse::new(vec![Message::assistant(text)]).with_usage(usage),
        ))
    }

    /// Queue an assistant message requesting tool calls
    pub fn then_tool_calls(self, calls: Vec<ToolCall>, usage: Usage) -> Self {
        self.then(ScriptStep::Respond(
            CompletionResponse::new(vec![Message::assistant_with_tool_calls("", calls)]).with_usage(usage),
        ))
    }

    /// Wait this long before answering each request
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn echo(request: &CompletionRequest) -> CompletionResponse {
        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.clone())
            .unwrap_or_else(|| "Hello from ScriptedProvider!".to_string());
        CompletionResponse::new(vec![Message::assistant(format!("Echo: {}", last_user))])
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn requires_api_key(&self) -> bool {
        false
    }

    async fn complete(
        &self,
        request: CompletionRequest,
        cancel_token: CancellationToken,
    ) -> ProviderResult<CompletionResponse> {
        self.requests.lock().push(request.clone());
        self.logger.debug(&format!(
            "ScriptedProvider: complete called with {} message(s)",
            request.messages.len()
        ));

        if let Some(delay) = self.delay {
            cancel_token
                .run(tokio::time::sleep(delay))
                .await
                .ok_or(ProviderError::Cancelled)?;
        }
        if cancel_token.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        let step = self.script.lock().pop_front();
        match step {
            Some(ScriptStep::Respond(response)) => Ok(response),
            Some(ScriptStep::Fail(message)) => Err(ProviderError::Other(format!("Mock error: {}", message))),
            Some(ScriptStep::Empty) => Ok(CompletionResponse::new(Vec::new())),
            None => Ok(Self::echo(&request)),
        }
    }
}
