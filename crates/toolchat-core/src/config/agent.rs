//! Agent-level defaults

use serde::{Deserialize, Serialize};

use crate::types::{GenerationParams, Message};

/// Immutable defaults for every turn an agent runs
///
/// Per-call values are layered on top with `GenerationParams::merged_with`
/// and the per-call system instruction; the config itself never changes
/// after construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Model identifier sent with every request
    pub model: String,
    /// Default system instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
    /// Messages placed before the user message when no history is loaded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
    /// Default generation parameters
    #[serde(default)]
    pub params: GenerationParams,
}

impl AgentConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Model used for a call given its overrides
    pub fn effective_model<'a>(&'a self, overrides: &'a GenerationParams) -> &'a str {
        overrides.model.as_deref().unwrap_or(&self.model)
    }
}
