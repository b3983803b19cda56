//! Tool definitions and their validation

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::error::{ToolError, ToolResult};

/// Maximum length of a tool name
pub const MAX_TOOL_NAME_LEN: usize = 64;

/// Schema of a tool offered to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Function name, `[A-Za-z0-9_-]{1,64}`
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema object for the arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            parameters: None,
            strict: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    /// Check every constraint, name first
    pub fn validate(&self) -> ToolResult<()> {
        validate_name(&self.name)?;
        if let Some(parameters) = &self.parameters {
            if !parameters.is_object() {
                return Err(ToolError::validation(format!(
                    "parameters of '{}' must be a non-null object",
                    self.name
                )));
            }
        }
        Ok(())
    }

    /// Whether `value` has the descriptor shape (`{"type": "function", ...}`)
    pub fn is_descriptor(value: &Value) -> bool {
        value.get("type").and_then(Value::as_str) == Some("function")
    }

    /// Parse and validate a `{"type": "function", "function": {...}}` descriptor
    pub fn from_descriptor(value: &Value) -> ToolResult<Self> {
        if !Self::is_descriptor(value) {
            return Err(ToolError::validation("type must be \"function\""));
        }
        let function = value
            .get("function")
            .and_then(Value::as_object)
            .ok_or_else(|| ToolError::validation("function must be an object"))?;

        let name = match function.get("name") {
            Some(Value::String(name)) => name.clone(),
            _ => return Err(ToolError::validation("name must be a string")),
        };
        validate_name(&name)?;

        let description = match function.get("description") {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(_) => {
                return Err(ToolError::validation(format!(
                    "description of '{name}' must be a string"
                )))
            }
        };

        let parameters = match function.get("parameters") {
            None => None,
            Some(params @ Value::Object(_)) => Some(params.clone()),
            Some(_) => {
                return Err(ToolError::validation(format!(
                    "parameters of '{name}' must be a non-null object"
                )))
            }
        };

        let strict = match function.get("strict") {
            None => None,
            Some(Value::Bool(flag)) => Some(*flag),
            Some(_) => {
                return Err(ToolError::validation(format!(
                    "strict of '{name}' must be a boolean"
                )))
            }
        };

        Ok(Self {
            name,
            description,
            parameters,
            strict,
        })
    }

    /// Render as a `{"type": "function", "function": {...}}` descriptor
    pub fn to_descriptor(&self) -> Value {
        let mut function = Map::new();
        function.insert("name".into(), Value::String(self.name.clone()));
        if let Some(description) = &self.description {
            function.insert("description".into(), Value::String(description.clone()));
        }
        if let Some(parameters) = &self.parameters {
            function.insert("parameters".into(), parameters.clone());
        }
        if let Some(strict) = self.strict {
            function.insert("strict".into(), Value::Bool(strict));
        }
        json!({ "type": "function", "function": function })
    }
}

/// Validate a tool name: length 1..=64, then `[A-Za-z0-9_-]`
pub fn validate_name(name: &str) -> ToolResult<()> {
    if name.is_empty() || name.len() > MAX_TOOL_NAME_LEN {
        return Err(ToolError::validation(format!(
            "name must be 1-{MAX_TOOL_NAME_LEN} characters (got {})",
            name.len()
        )));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(ToolError::validation(format!(
            "name '{name}' must match [A-Za-z0-9_-] (found '{bad}')"
        )));
    }
    Ok(())
}
