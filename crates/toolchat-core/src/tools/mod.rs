//! Tool management module
//!
//! Loading, validating, resolving and dispatching locally registered tools.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────┐      ┌──────────────────────────────┐
//! │  ToolSource              │      │  ToolRegistry                │
//! │  - StaticToolSource      │ ───▶ │  - classify exports          │
//! │  - DirectoryToolSource   │ load │  - validate definitions      │
//! └──────────────────────────┘      │  - publish RegistrySnapshot  │
//!                                   └──────────────┬───────────────┘
//!                                                  │ resolve(names)
//!                                                  ▼
//!                                   ┌──────────────────────────────┐
//!                                   │  dispatch(calls, impls)      │
//!                                   │  one tool message per call   │
//!                                   └──────────────────────────────┘
//! ```

mod definition;
mod dispatcher;
mod error;
mod handler;
mod registry;
mod source;

pub use definition::{validate_name, ToolDefinition, MAX_TOOL_NAME_LEN};
pub use dispatcher::{dispatch, error_content};
pub use error::{ToolError, ToolInvokeError, ToolResult};
pub use handler::{sync_tool_fn, tool_fn, FnTool, SyncFnTool, ToolImplementation, ToolOutcome};
pub use registry::{ImplementationMap, RegistrySnapshot, ResolvedTools, ToolRegistry};
pub use source::{
    DirectoryToolSource, HandlerCatalog, StaticToolSource, ToolArtifact, ToolExport, ToolSource,
};
