//! Provider error types

use thiserror::Error;

/// Errors that can occur during provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Missing API key
    #[error("API key is required for {provider}")]
    MissingApiKey { provider: String },

    /// API request failed
    #[error("{provider} API error ({status}): {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Request was cancelled
    #[error("Request cancelled")]
    Cancelled,

    /// The provider answered without any message
    #[error("{provider} returned no message")]
    EmptyResponse { provider: String },

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Create an API error
    pub fn api_error(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a missing API key error
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    /// Create an empty-response error
    pub fn empty_response(provider: impl Into<String>) -> Self {
        Self::EmptyResponse {
            provider: provider.into(),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
