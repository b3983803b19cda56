//! Provider trait definition

use async_trait::async_trait;

use super::error::ProviderResult;
use crate::types::{CancellationToken, CompletionRequest, CompletionResponse};

/// Connection settings for a provider
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProviderSettings {
    /// Provider identifier (e.g., "openai", "anthropic", "ollama")
    pub provider: String,
    /// API key; resolved from a secret store when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Custom API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl ProviderSettings {
    /// Create settings for a provider
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            api_key: None,
            api_base: None,
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the API base URL
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }
}

/// Completion provider
///
/// Implementations return every candidate message the backend produced. An
/// empty `candidates` list is the "no message returned" condition; callers
/// decide how to treat it.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "anthropic")
    fn name(&self) -> &str;

    /// Whether requests fail without an API key
    fn requires_api_key(&self) -> bool {
        true
    }

    /// Run one non-streaming completion
    async fn complete(
        &self,
        request: CompletionRequest,
        cancel_token: CancellationToken,
    ) -> ProviderResult<CompletionResponse>;
}
