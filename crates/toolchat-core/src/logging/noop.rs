//! No-op and capturing logger implementations

use parking_lot::Mutex;

use super::traits::{LogLevel, Logger};

/// A logger that does nothing
///
/// Useful for testing or when logging is not needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl NoOpLogger {
    /// Create a new no-op logger
    pub fn new() -> Self {
        Self
    }
}

impl Logger for NoOpLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// A logger that keeps every line in memory
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured lines in emission order
    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().clone()
    }

    /// Captured messages at exactly `level`
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.lines.lock().push((level, message.to_string()));
    }
}

impl Logger for MemoryLogger {
    fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_logger() {
        let logger = NoOpLogger::new();
        logger.debug("debug message");
        logger.error("error message");
    }

    #[test]
    fn test_memory_logger_captures_in_order() {
        let logger = MemoryLogger::new();
        logger.info("one");
        logger.log(LogLevel::Warn, "two");
        crate::log_debug!(logger, "three {}", 3);

        assert_eq!(
            logger.lines(),
            vec![
                (LogLevel::Info, "one".to_string()),
                (LogLevel::Warn, "two".to_string()),
                (LogLevel::Debug, "three 3".to_string()),
            ]
        );
        assert_eq!(logger.messages_at(LogLevel::Warn), vec!["two".to_string()]);
    }
}
