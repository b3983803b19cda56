//! Adapter between toolchat types and genai types
//!
//! Conversions run in both directions: requests are lowered to genai's chat
//! messages, tools and options; responses are lifted back into a
//! `CompletionResponse`.

use std::future::Future;
use std::pin::Pin;

use genai::chat::{
    ChatMessage as GenaiMessage, ChatOptions as GenaiOptions, ChatResponse as GenaiResponse,
    Tool as GenaiTool, ToolCall as GenaiToolCall, ToolResponse as GenaiToolResponse,
};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};
use serde_json::{json, Value};

use crate::tools::ToolDefinition;
use crate::types::{CompletionResponse, GenerationParams, Message, MessageRole, ToolCall, Usage};

use super::error::{ProviderError, ProviderResult};
use super::traits::ProviderSettings;

// ============================================================================
// Message Conversion: toolchat -> genai
// ============================================================================

/// Convert a tool call into genai's representation
///
/// Arguments that are not valid JSON are passed through as a JSON string.
pub fn to_genai_tool_call(call: &ToolCall) -> ProviderResult<GenaiToolCall> {
    let arguments = call
        .parse_arguments()
        .unwrap_or_else(|_| Value::String(call.arguments.clone()));
    let value = json!({
        "call_id": call.id,
        "fn_name": call.name,
        "fn_arguments": arguments,
    });
    Ok(serde_json::from_value(value)?)
}

/// Convert one message
///
/// Assistant messages that request tools are sent as tool-call messages; any
/// accompanying text is not forwarded.
pub fn to_genai_message(msg: &Message) -> ProviderResult<GenaiMessage> {
    let converted = match msg.role {
        MessageRole::System => GenaiMessage::system(msg.content.clone()),
        MessageRole::User => GenaiMessage::user(msg.content.clone()),
        MessageRole::Assistant if msg.has_tool_calls() => {
            let calls = msg
                .calls()
                .iter()
                .map(to_genai_tool_call)
                .collect::<ProviderResult<Vec<_>>>()?;
            GenaiMessage::from(calls)
        }
        MessageRole::Assistant => GenaiMessage::assistant(msg.content.clone()),
        MessageRole::Tool => {
            let call_id = msg.tool_call_id.clone().unwrap_or_default();
            GenaiMessage::from(GenaiToolResponse::new(call_id, msg.content.clone()))
        }
    };
    Ok(converted)
}

/// Convert a message sequence, preserving order
pub fn to_genai_messages(messages: &[Message]) -> ProviderResult<Vec<GenaiMessage>> {
    messages.iter().map(to_genai_message).collect()
}

// ============================================================================
// Tool Conversion: toolchat -> genai
// ============================================================================

/// Convert a tool definition
///
/// genai's tool type has no strict-schema flag, so `strict` is not sent.
pub fn to_genai_tool(tool: &ToolDefinition) -> GenaiTool {
    let mut genai_tool = GenaiTool::new(tool.name.clone());

    if let Some(description) = &tool.description {
        genai_tool = genai_tool.with_description(description.clone());
    }
    if let Some(schema) = &tool.parameters {
        genai_tool = genai_tool.with_schema(schema.clone());
    }

    genai_tool
}

pub fn to_genai_tools(tools: &[ToolDefinition]) -> Vec<GenaiTool> {
    tools.iter().map(to_genai_tool).collect()
}

// ============================================================================
// Options Conversion: toolchat -> genai
// ============================================================================

/// Convert generation parameters
///
/// genai has no portable knob for `seed`, the penalties or `tool_choice`;
/// those are dropped here and the backend default applies.
pub fn to_genai_options(params: &GenerationParams) -> GenaiOptions {
    let mut genai_opts = GenaiOptions::default();

    if let Some(temp) = params.temperature {
        genai_opts = genai_opts.with_temperature(temp as f64);
    }
    if let Some(top_p) = params.top_p {
        genai_opts = genai_opts.with_top_p(top_p as f64);
    }
    if let Some(max_tokens) = params.max_tokens {
        genai_opts = genai_opts.with_max_tokens(max_tokens);
    }
    if let Some(stop) = &params.stop {
        genai_opts = genai_opts.with_stop_sequences(stop.clone());
    }

    genai_opts
}

// ============================================================================
// Response Conversion: genai -> toolchat
// ============================================================================

/// Convert a genai tool call back into ours
pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ToolCall {
    ToolCall::with_value(tc.call_id.clone(), tc.fn_name.clone(), &tc.fn_arguments)
}

/// Lift a genai chat response into a `CompletionResponse`
///
/// The response carries at most one candidate. Neither text nor tool calls
/// means no candidate at all.
pub fn from_genai_response(response: &GenaiResponse) -> CompletionResponse {
    let text = response.first_text().map(str::to_string);
    let calls: Vec<ToolCall> = response
        .tool_calls()
        .into_iter()
        .map(from_genai_tool_call)
        .collect();

    let candidate = match (text, calls.is_empty()) {
        (text, false) => Some(Message::assistant_with_tool_calls(text.unwrap_or_default(), calls)),
        (Some(text), true) => Some(Message::assistant(text)),
        (None, true) => None,
    };

    let usage = &response.usage;
    let tokens = |v: Option<i32>| v.map(|n| n.max(0) as u64);
    let prompt = tokens(usage.prompt_tokens);
    let completion = tokens(usage.completion_tokens);
    let total = tokens(usage.total_tokens);
    let usage = if prompt.is_some() || completion.is_some() || total.is_some() {
        let prompt = prompt.unwrap_or(0);
        let completion = completion.unwrap_or(0);
        Some(Usage::new(prompt, completion, total.unwrap_or(prompt + completion)))
    } else {
        None
    };

    let candidates: Vec<Message> = candidate.into_iter().collect();
    let raw = json!({
        "candidates": candidates,
        "usage": usage,
    });

    let mut converted = CompletionResponse::new(candidates).with_raw(raw);
    if let Some(usage) = usage {
        converted = converted.with_usage(usage);
    }
    converted
}

// ============================================================================
// Provider to Secret Key Mapping
// ============================================================================

/// Map a provider ID to its secret store key name
pub fn provider_to_secret_key(provider: &str) -> String {
    match provider.to_lowercase().as_str() {
        "openai" => "openai_api_key".to_string(),
        "anthropic" => "anthropic_api_key".to_string(),
        "gemini" | "google" => "google_api_key".to_string(),
        "groq" => "groq_api_key".to_string(),
        "xai" => "xai_api_key".to_string(),
        "deepseek" => "deepseek_api_key".to_string(),
        "cohere" => "cohere_api_key".to_string(),
        "azure" => "azure_openai_api_key".to_string(),
        "openrouter" => "openrouter_api_key".to_string(),
        "mistral" => "mistral_api_key".to_string(),
        other => format!("{}_api_key", other),
    }
}

/// Whether a provider refuses requests without an API key
pub fn requires_api_key(provider: &str) -> bool {
    !matches!(provider.to_lowercase().as_str(), "ollama" | "mock")
}

// ============================================================================
// Client Creation with Custom Auth
// ============================================================================

/// Create a genai client bound to one provider's settings
///
/// The key from `settings` is always used for auth; genai's own environment
/// lookup only applies when none was supplied. A custom `api_base` routes
/// the request through the OpenAI-compatible adapter.
pub fn create_client(settings: &ProviderSettings) -> ProviderResult<Client> {
    let provider = settings.provider.to_lowercase();
    if provider == "azure" && settings.api_base.is_none() {
        return Err(ProviderError::Other(
            "azure requires api_base to be configured".to_string(),
        ));
    }

    let auth_key = settings.api_key.clone();
    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let key = auth_key.clone();
            Box::pin(async move { Ok(key.map(AuthData::from_single)) })
        },
    );

    let api_base = settings.api_base.clone();
    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            let endpoint = match (provider.as_str(), api_base.as_ref()) {
                (_, Some(base)) => Endpoint::from_owned(base.clone()),
                ("openrouter", None) => Endpoint::from_static("https://openrouter.ai/api/v1/"),
                ("mistral", None) => Endpoint::from_static("https://api.mistral.ai/v1/"),
                _ => return Ok(target),
            };

            let ServiceTarget { model, auth, .. } = target;
            Ok(ServiceTarget {
                endpoint,
                auth,
                model: ModelIden::new(AdapterKind::OpenAI, model.model_name),
            })
        },
    );

    Ok(Client::builder()
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_call_conversion_keeps_arguments() {
        let call = ToolCall::new("c1", "add", r#"{"a":2,"b":2}"#);
        let genai_call = to_genai_tool_call(&call).unwrap();
        assert_eq!(genai_call.call_id, "c1");
        assert_eq!(genai_call.fn_name, "add");
        assert_eq!(genai_call.fn_arguments, json!({"a": 2, "b": 2}));

        let back = from_genai_tool_call(&genai_call);
        assert_eq!(back.parse_arguments().unwrap(), json!({"a": 2, "b": 2}));
    }

    #[test]
    fn test_malformed_arguments_pass_through_as_string() {
        let call = ToolCall::new("c1", "add", "{not json");
        let genai_call = to_genai_tool_call(&call).unwrap();
        assert_eq!(genai_call.fn_arguments, json!("{not json"));
    }

    #[test]
    fn test_message_sequence_conversion() {
        let messages = vec![
            Message::system("be brief"),
            Message::user("add"),
            Message::assistant_with_tool_calls("", vec![ToolCall::new("c1", "add", "{}")]),
            Message::tool("c1", "4"),
            Message::assistant("4"),
        ];
        let converted = to_genai_messages(&messages).unwrap();
        assert_eq!(converted.len(), 5);
    }

    #[test]
    fn test_tool_conversion() {
        let tool = ToolDefinition::new("get_weather")
            .with_description("Get weather for a location")
            .with_parameters(json!({
                "type": "object",
                "properties": { "location": { "type": "string" } }
            }));

        let genai_tool = to_genai_tool(&tool);
        assert_eq!(genai_tool.name, "get_weather");

        // Strict tools convert the same way
        let strict = to_genai_tool(&tool.clone().with_strict(true));
        assert_eq!(strict.name, "get_weather");
        assert!(strict.schema.is_some());
    }

    #[test]
    fn test_secret_key_mapping() {
        assert_eq!(provider_to_secret_key("OpenAI"), "openai_api_key");
        assert_eq!(provider_to_secret_key("gemini"), "google_api_key");
        assert_eq!(provider_to_secret_key("acme"), "acme_api_key");
        assert!(requires_api_key("anthropic"));
        assert!(!requires_api_key("ollama"));
    }

    #[test]
    fn test_azure_without_base_is_rejected() {
        let result = create_client(&ProviderSettings::new("azure").with_api_key("k"));
        assert!(result.is_err());
        assert!(create_client(&ProviderSettings::new("openai").with_api_key("k")).is_ok());
    }
}
