//! Completion orchestration
//!
//! `Agent` composes a `CompletionProvider`, a `ToolRegistry` and an optional
//! `HistoryStore` to run one conversational turn at a time.
//!
//! ```rust,ignore
//! use toolchat_core::agent::{Agent, ConverseOptions, ConversationHistory};
//!
//! let agent = Agent::from_settings(config, settings, &EnvSecretStore::new(), logger)?;
//! agent.configure_tool_source(source)?;
//!
//! let result = agent
//!     .converse(
//!         "What's the weather in Paris?",
//!         ConverseOptions::new()
//!             .with_tools(["get_weather"])
//!             .with_history(ConversationHistory::new("u1")),
//!     )
//!     .await?;
//! ```

mod assemble;
mod error;
mod options;
mod orchestrator;

pub use assemble::{apply_system_instruction, resolve_instruction};
pub use error::{AgentError, AgentResult, TurnPhase};
pub use options::{ConversationHistory, ConverseOptions};
pub use orchestrator::Agent;
