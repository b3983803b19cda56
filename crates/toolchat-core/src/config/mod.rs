//! Configuration
//!
//! - `AgentConfig`: immutable per-agent defaults
//! - `ConfigFile`: YAML layout with `agent`, `provider`, `tools` and `history` sections
//! - `FileConfigLoader`: user/workspace YAML files, cached with `reload()`
//! - `MemoryConfigLoader`: in-memory for testing

mod traits;
mod agent;
mod memory;
mod file;

pub use traits::{load_layered, ConfigError, ConfigLoader, ConfigResult};
pub use agent::AgentConfig;
pub use memory::MemoryConfigLoader;
pub use file::{ConfigFile, ConfigLevel, FileConfigLoader, HistorySettings, ToolsSettings};
