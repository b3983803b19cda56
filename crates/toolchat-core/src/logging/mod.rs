//! Logging abstractions
//!
//! Components receive an `Arc<dyn Logger>` at construction and never reach
//! for a global.

mod traits;
mod noop;
mod console;

pub use traits::{LogLevel, Logger};
pub use noop::{MemoryLogger, NoOpLogger};
pub use console::ConsoleLogger;
