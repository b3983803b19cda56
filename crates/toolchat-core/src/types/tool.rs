//! Tool/function calling types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool call issued by the model
///
/// `arguments` is kept exactly as the model produced it; parsing happens
/// at dispatch time so that malformed arguments become an in-band error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Raw argument string
    pub arguments: String,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Create a tool call from structured arguments
    pub fn with_value(id: impl Into<String>, name: impl Into<String>, arguments: &Value) -> Self {
        Self::new(id, name, arguments.to_string())
    }

    /// Parse the raw argument string
    ///
    /// An empty argument string is treated as an empty object.
    pub fn parse_arguments(&self) -> Result<Value, serde_json::Error> {
        if self.arguments.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(&self.arguments)
    }
}

/// Tool choice policy for requests
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// Let the model decide whether to use tools
    #[default]
    Auto,
    /// Don't use tools
    None,
    /// Force tool use
    Required,
    /// Force a specific function
    Function { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_call_arguments() {
        let call = ToolCall::with_value(
            "call_123",
            "get_weather",
            &json!({ "location": "San Francisco" }),
        );
        let args = call.parse_arguments().unwrap();
        assert_eq!(args["location"], "San Francisco");

        let empty = ToolCall::new("call_1", "ping", "  ");
        assert_eq!(empty.parse_arguments().unwrap(), json!({}));

        let broken = ToolCall::new("call_2", "ping", "{not json");
        assert!(broken.parse_arguments().is_err());
    }

    #[test]
    fn test_tool_choice_serialization() {
        assert_eq!(serde_json::to_value(ToolChoice::Auto).unwrap(), json!("auto"));
        assert_eq!(
            serde_json::to_value(ToolChoice::Function { name: "f".into() }).unwrap(),
            json!({ "function": { "name": "f" } })
        );
        let parsed: ToolChoice = serde_yaml::from_str("required").unwrap();
        assert_eq!(parsed, ToolChoice::Required);
    }
}
