//! Toolchat Core
//!
//! Tool-augmented chat completion: a conversational turn can pause for the
//! model to call locally registered functions and resume with their results.
//!
//! - `tools`: registry snapshots, tool sources and the concurrent dispatcher
//! - `history`: per-user message logs over an ordered list store (memory or Redis)
//! - `providers`: the `CompletionProvider` seam, a genai-backed provider and a scripted mock
//! - `agent`: the orchestrator tying them together
//!
//! ```rust,ignore
//! use toolchat_core::{Agent, AgentConfig, ConverseOptions, ProviderSettings, EnvSecretStore};
//!
//! let agent = Agent::from_settings(
//!     AgentConfig::new("gpt-4o-mini"),
//!     ProviderSettings::new("openai"),
//!     &EnvSecretStore::new(),
//!     logger,
//! )?;
//! agent.configure_tool_source(tools)?;
//!
//! let result = agent
//!     .converse("What's 2+2?", ConverseOptions::new().with_tools(["add"]))
//!     .await?;
//! println!("{}", result.choices[0]);
//! ```

pub mod types;
pub mod secrets;
pub mod logging;
pub mod config;
pub mod providers;
pub mod tools;
pub mod history;
pub mod agent;

// Re-export commonly used types
pub use types::{
    CancellationToken, CompletionRequest, CompletionResponse, CompletionResult, GenerationParams,
    Message, MessageRole, ToolCall, ToolChoice, Usage,
};

pub use secrets::{EnvSecretStore, MemorySecretStore, SecretStore, SecretStoreError};

pub use logging::{ConsoleLogger, LogLevel, Logger, NoOpLogger};

pub use config::{AgentConfig, ConfigFile, ConfigLoader, FileConfigLoader};

pub use providers::{CompletionProvider, GenaiProvider, ProviderError, ProviderSettings, ScriptedProvider};

pub use tools::{
    HandlerCatalog, StaticToolSource, ToolDefinition, ToolError, ToolImplementation, ToolRegistry,
};

pub use history::{HistoryConfig, HistoryStore, ListStore, MemoryListStore, ReadOptions, RedisListStore};

pub use agent::{Agent, AgentError, AgentResult, ConversationHistory, ConverseOptions, TurnPhase};
