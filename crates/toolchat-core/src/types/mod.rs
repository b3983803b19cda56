//! Core types for conversational turns
//!
//! This module contains the message, tool-call, usage and request/result
//! types shared by the provider, tool and history layers.

mod message;
mod tool;
mod usage;
mod completion;
mod cancellation;

pub use message::{Message, MessageRole};
pub use tool::{ToolCall, ToolChoice};
pub use usage::Usage;
pub use completion::{CompletionRequest, CompletionResponse, CompletionResult, GenerationParams};
pub use cancellation::CancellationToken;
