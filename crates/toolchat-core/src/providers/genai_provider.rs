//! GenaiProvider - completion transport using the genai crate
//!
//! Handles every genai-supported backend (OpenAI, Anthropic, Gemini, Ollama, ...)
//! and OpenAI-compatible endpoints selected through `api_base`.

use std::sync::Arc;

use async_trait::async_trait;
use genai::chat::ChatRequest;
use genai::Client;

use crate::logging::Logger;
use crate::types::{CancellationToken, CompletionRequest, CompletionResponse};

use super::error::{ProviderError, ProviderResult};
use super::genai_adapter::{
    create_client, from_genai_response, requires_api_key, to_genai_messages, to_genai_options,
    to_genai_tools,
};
use super::traits::{CompletionProvider, ProviderSettings};

/// Provider backed by a genai client
pub struct GenaiProvider {
    settings: ProviderSettings,
    client: Client,
    logger: Arc<dyn Logger>,
}

impl GenaiProvider {
    /// Create a provider from connection settings
    ///
    /// Fails when the provider needs an API key and none was supplied.
    pub fn new(settings: ProviderSettings, logger: Arc<dyn Logger>) -> ProviderResult<Self> {
        if settings.api_key.is_none() && requires_api_key(&settings.provider) {
            return Err(ProviderError::missing_api_key(&settings.provider));
        }
        let client = create_client(&settings)?;
        Ok(Self {
            settings,
            client,
            logger,
        })
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    /// Extract model name from a model string (e.g., "openai/gpt-4" -> "gpt-4")
    pub fn extract_model_name(model: &str) -> &str {
        model.split_once('/').map_or(model, |(_, name)| name)
    }
}

#[async_trait]
impl CompletionProvider for GenaiProvider {
    fn name(&self) -> &str {
        &self.settings.provider
    }

    fn requires_api_key(&self) -> bool {
        requires_api_key(&self.settings.provider)
    }

    async fn complete(
        &self,
        request: CompletionRequest,
        cancel_token: CancellationToken,
    ) -> ProviderResult<CompletionResponse> {
        let model_name = Self::extract_model_name(&request.model);
        self.logger.info(&format!(
            "[GenaiProvider] complete called: provider={}, model={}, messages={}",
            self.settings.provider,
            model_name,
            request.messages.len()
        ));

        let mut chat_req = ChatRequest::new(to_genai_messages(&request.messages)?);
        if let Some(tools) = request.tools.as_deref().filter(|t| !t.is_empty()) {
            chat_req = chat_req.with_tools(to_genai_tools(tools));
        }
        let options = to_genai_options(&request.params);

        let response = cancel_token
            .run(self.client.exec_chat(model_name, chat_req, Some(&options)))
            .await
            .ok_or(ProviderError::Cancelled)?
            .map_err(|e| {
                self.logger.error(&format!("[GenaiProvider] Request failed: {}", e));
                ProviderError::api_error(&self.settings.provider, 500, e.to_string())
            })?;

        let converted = from_genai_response(&response);
        self.logger.debug(&format!(
            "[GenaiProvider] Received {} candidate(s)",
            converted.candidates.len()
        ));
        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;

    fn test_logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    #[test]
    fn test_extract_model_name() {
        assert_eq!(GenaiProvider::extract_model_name("openai/gpt-4"), "gpt-4");
        assert_eq!(
            GenaiProvider::extract_model_name("ollama/llama3:8b"),
            "llama3:8b"
        );
        assert_eq!(GenaiProvider::extract_model_name("gpt-4"), "gpt-4");
    }

    #[test]
    fn test_missing_key_rejected() {
        let result = GenaiProvider::new(ProviderSettings::new("anthropic"), test_logger());
        assert!(matches!(result, Err(ProviderError::MissingApiKey { .. })));
    }

    #[test]
    fn test_keyless_provider_allowed() {
        let provider = GenaiProvider::new(ProviderSettings::new("ollama"), test_logger()).unwrap();
        assert_eq!(provider.name(), "ollama");
        assert!(!provider.requires_api_key());
    }

    #[tokio::test]
    async fn test_cancelled_before_send() {
        let provider = GenaiProvider::new(
            ProviderSettings::new("openai").with_api_key("sk-test"),
            test_logger(),
        )
        .unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let request = CompletionRequest {
            model: "gpt-4o-mini".to_string(),
            params: Default::default(),
            messages: vec![crate::types::Message::user("hi")],
            tools: None,
            tool_choice: None,
        };
        let result = provider.complete(request, cancel).await;
        assert!(matches!(result, Err(ProviderError::Cancelled)));
    }
}
