//! Per-call options for `Agent::converse`

use crate::history::ReadOptions;
use crate::types::{CancellationToken, GenerationParams};

/// Which user's history a turn reads from and appends to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationHistory {
    pub user_id: String,
    /// How much prior history to place before the new message; `None` uses
    /// the store's default read options
    pub read: Option<ReadOptions>,
}

impl ConversationHistory {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            read: None,
        }
    }

    pub fn with_read(mut self, read: ReadOptions) -> Self {
        self.read = Some(read);
        self
    }
}

/// Options for one turn
///
/// Everything is optional; an empty value runs a plain completion with the
/// agent's defaults.
#[derive(Debug, Clone, Default)]
pub struct ConverseOptions {
    /// Overrides the agent default for this call. `Some("")` suppresses it.
    pub system_instruction: Option<String>,
    /// Names of registered tools offered to the model
    pub tools: Option<Vec<String>>,
    /// Generation parameters layered over the agent defaults
    pub overrides: GenerationParams,
    /// Load and persist this user's history
    pub history: Option<ConversationHistory>,
    pub cancel: Option<CancellationToken>,
}

impl ConverseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_tools<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_overrides(mut self, overrides: GenerationParams) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_history(mut self, history: ConversationHistory) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Requested tool names, or `None` when no tools were asked for
    pub fn requested_tools(&self) -> Option<&[String]> {
        self.tools.as_deref().filter(|names| !names.is_empty())
    }
}
