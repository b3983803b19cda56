//! In-memory configuration loader

use parking_lot::RwLock;

use super::file::ConfigFile;
use super::traits::{ConfigLoader, ConfigResult};

/// In-memory configuration loader for testing
#[derive(Debug, Default)]
pub struct MemoryConfigLoader {
    config: RwLock<ConfigFile>,
}

impl MemoryConfigLoader {
    pub fn new(config: ConfigFile) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    /// Replace the held configuration
    pub fn set(&self, config: ConfigFile) {
        *self.config.write() = config;
    }
}

impl ConfigLoader for MemoryConfigLoader {
    fn load_config(&self) -> ConfigResult<ConfigFile> {
        Ok(self.config.read().clone())
    }
}
