//! Tool registry and dispatch error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, resolving or dispatching tools
#[derive(Error, Debug)]
pub enum ToolError {
    /// A tool definition violates a schema constraint
    #[error("Invalid tool definition: {constraint}")]
    Validation { constraint: String },

    /// Requested tools are absent from the active snapshot
    #[error("Tool(s) not found: {}", .names.join(", "))]
    NotFound { names: Vec<String> },

    /// Definition and implementation counts differ
    #[error("Tool configuration error: {definitions} definition(s) but {implementations} implementation(s)")]
    CountMismatch {
        definitions: usize,
        implementations: usize,
    },

    /// Definitions without a same-named implementation
    #[error("Tool configuration error: missing implementation for {}", .names.join(", "))]
    MissingImplementation { names: Vec<String> },

    /// The tool directory could not be opened or listed
    #[error("Cannot access tool directory {}: {source}", .path.display())]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An artifact could not be read
    #[error("Cannot read tool artifact {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An artifact could not be parsed into exports
    #[error("Cannot import tool artifact {}: {message}", .path.display())]
    Import { path: PathBuf, message: String },

    /// An export looks like a tool but cannot be admitted
    #[error("Invalid tool '{symbol}' in {origin}: {message}")]
    InvalidTool {
        origin: String,
        symbol: String,
        message: String,
    },

    /// `resolve` was asked to load lazily but no source was ever configured
    #[error("No tool source configured")]
    NoSource,

    /// `dispatch` was called without any tool calls
    #[error("No tool calls to dispatch")]
    EmptyCalls,
}

impl ToolError {
    /// Create a validation error naming the violated constraint
    pub fn validation(constraint: impl Into<String>) -> Self {
        Self::Validation {
            constraint: constraint.into(),
        }
    }

    /// Create an invalid-tool error
    pub fn invalid_tool(
        origin: impl Into<String>,
        symbol: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidTool {
            origin: origin.into(),
            symbol: symbol.into(),
            message: message.into(),
        }
    }
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Failure reported by a tool implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ToolInvokeError(pub String);

impl ToolInvokeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for ToolInvokeError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for ToolInvokeError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

impl From<serde_json::Error> for ToolInvokeError {
    fn from(err: serde_json::Error) -> Self {
        Self(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_list_names() {
        let err = ToolError::NotFound {
            names: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "Tool(s) not found: a, b");

        let err = ToolError::MissingImplementation {
            names: vec!["get_weather".into()],
        };
        assert!(err.to_string().contains("get_weather"));
    }
}
