//! History store error types

use thiserror::Error;

/// Errors that can occur during history operations
#[derive(Error, Debug)]
pub enum HistoryError {
    /// The underlying list store failed
    #[error("History store {operation} failed: {message}")]
    Store { operation: String, message: String },

    /// A stored entry could not be encoded or decoded
    #[error("History serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HistoryError {
    /// Create a store error for a named operation
    pub fn store(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

pub type HistoryResult<T> = Result<T, HistoryError>;
