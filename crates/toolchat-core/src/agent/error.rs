//! Agent error types

use thiserror::Error;

use crate::config::ConfigError;
use crate::history::HistoryError;
use crate::providers::ProviderError;
use crate::tools::ToolError;

/// Phase of a turn in which a fault occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Assemble,
    FirstCall,
    Dispatch,
    SecondCall,
    Persist,
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TurnPhase::Assemble => "assemble",
            TurnPhase::FirstCall => "first_call",
            TurnPhase::Dispatch => "dispatch",
            TurnPhase::SecondCall => "second_call",
            TurnPhase::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by `Agent`
#[derive(Error, Debug)]
pub enum AgentError {
    /// Bad configuration or arguments
    #[error("Validation error: {0}")]
    Validation(String),

    /// The provider needs an API key and none was found
    #[error("No API key found for provider {provider}")]
    MissingCredentials { provider: String },

    #[error(transparent)]
    Tools(#[from] ToolError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A history operation was requested but no store is attached
    #[error("History store is not configured")]
    HistoryNotConfigured,

    /// A conversational turn failed; nothing was written to history
    #[error("Turn failed during {phase}: {source}")]
    TurnFailed {
        phase: TurnPhase,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl AgentError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wrap a fault raised during `phase`
    pub fn turn_failed(
        phase: TurnPhase,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::TurnFailed {
            phase,
            source: source.into(),
        }
    }

    /// Phase of a failed turn
    pub fn phase(&self) -> Option<TurnPhase> {
        match self {
            Self::TurnFailed { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Whether the turn was stopped by its cancellation token
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::TurnFailed { source, .. } => {
                matches!(source.downcast_ref::<ProviderError>(), Some(ProviderError::Cancelled))
            }
            Self::Provider(ProviderError::Cancelled) => true,
            _ => false,
        }
    }
}

pub type AgentResult<T> = Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_failed_message_names_phase() {
        let err = AgentError::turn_failed(TurnPhase::SecondCall, ProviderError::empty_response("mock"));
        assert_eq!(err.to_string(), "Turn failed during second_call: mock returned no message");
        assert_eq!(err.phase(), Some(TurnPhase::SecondCall));
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_cancelled_detection() {
        let err = AgentError::turn_failed(TurnPhase::Dispatch, ProviderError::Cancelled);
        assert!(err.is_cancelled());
        assert!(std::error::Error::source(&err).is_some());
    }
}
