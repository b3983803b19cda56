//! Completion request and result types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::Message;
use super::tool::ToolChoice;
use super::usage::Usage;
use crate::tools::ToolDefinition;

/// Sampling and generation parameters
///
/// Every field is optional; an unset field is left to the provider's default.
/// The same type carries agent-level defaults and per-call overrides, see
/// [`GenerationParams::merged_with`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Model id override (the agent's model is used when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    /// Tool-choice policy, only sent when tools are attached to the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
}

impl GenerationParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }

    /// Merge per-call overrides on top of these defaults
    ///
    /// A field set in `overrides` wins; otherwise the default is kept.
    pub fn merged_with(&self, overrides: &GenerationParams) -> GenerationParams {
        GenerationParams {
            model: overrides.model.clone().or_else(|| self.model.clone()),
            temperature: overrides.temperature.or(self.temperature),
            top_p: overrides.top_p.or(self.top_p),
            max_tokens: overrides.max_tokens.or(self.max_tokens),
            stop: overrides.stop.clone().or_else(|| self.stop.clone()),
            seed: overrides.seed.or(self.seed),
            presence_penalty: overrides.presence_penalty.or(self.presence_penalty),
            frequency_penalty: overrides.frequency_penalty.or(self.frequency_penalty),
            tool_choice: overrides.tool_choice.clone().or_else(|| self.tool_choice.clone()),
        }
    }
}

/// A request submitted to a completion provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub params: GenerationParams,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
}

/// A provider's answer to one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Candidate messages, best first
    pub candidates: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// Provider payload as received, for callers that need provider-specific fields
    #[serde(default)]
    pub raw: Value,
}

impl CompletionResponse {
    pub fn new(candidates: Vec<Message>) -> Self {
        Self {
            candidates,
            usage: None,
            raw: Value::Null,
        }
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = raw;
        self
    }

    /// The candidate that continues the conversation
    pub fn first_message(&self) -> Option<&Message> {
        self.candidates.first()
    }

    /// Text of every candidate
    pub fn choices(&self) -> Vec<String> {
        self.candidates.iter().map(|m| m.content.clone()).collect()
    }
}

/// Outcome of one conversational turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionResult {
    /// Candidate texts of the final provider response
    pub choices: Vec<String>,
    /// Usage summed over every provider call of the turn
    pub usage: Usage,
    /// Messages produced by this turn, starting with the user message
    pub completion_messages: Vec<Message>,
    /// Provider responses in call order (one or two)
    pub raw_responses: Vec<CompletionResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_overrides() {
        let defaults = GenerationParams::new()
            .with_temperature(0.2)
            .with_max_tokens(256)
            .with_tool_choice(ToolChoice::Auto);
        let overrides = GenerationParams::new()
            .with_temperature(0.9)
            .with_model("gpt-4o-mini");

        let merged = defaults.merged_with(&overrides);
        assert_eq!(merged.temperature, Some(0.9));
        assert_eq!(merged.max_tokens, Some(256));
        assert_eq!(merged.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(merged.tool_choice, Some(ToolChoice::Auto));
    }

    #[test]
    fn test_merge_with_empty_overrides_is_identity() {
        let defaults = GenerationParams::new().with_stop(vec!["END".into()]);
        assert_eq!(defaults.merged_with(&GenerationParams::default()), defaults);
    }

    #[test]
    fn test_response_choices() {
        let response = CompletionResponse::new(vec![Message::assistant("a"), Message::assistant("b")]);
        assert_eq!(response.choices(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(response.first_message().map(|m| m.content.as_str()), Some("a"));
        assert!(CompletionResponse::new(vec![]).first_message().is_none());
    }
}
