//! Completion providers
//!
//! ## Architecture
//!
//! Real traffic goes through the `genai` crate, which handles the
//! provider-specific protocols and tool calling. OpenAI-compatible endpoints
//! are reached via genai's `ServiceTargetResolver` when an `api_base` is set.
//!
//! The `ScriptedProvider` replays canned responses for tests.

mod traits;
mod error;
mod genai_adapter;
mod genai_provider;
mod mock;

pub use traits::{CompletionProvider, ProviderSettings};
pub use error::{ProviderError, ProviderResult};

pub use genai_provider::GenaiProvider;
pub use genai_adapter::{provider_to_secret_key, requires_api_key};

pub use mock::{ScriptStep, ScriptedProvider};

use crate::logging::Logger;
use std::sync::Arc;

/// Create a provider for the given settings
///
/// `mock` yields an echoing `ScriptedProvider`; everything else goes to genai.
pub fn create_provider(
    settings: ProviderSettings,
    logger: Arc<dyn Logger>,
) -> ProviderResult<Arc<dyn CompletionProvider>> {
    match settings.provider.to_lowercase().as_str() {
        "mock" => Ok(Arc::new(ScriptedProvider::new(logger))),
        _ => Ok(Arc::new(GenaiProvider::new(settings, logger)?)),
    }
}
