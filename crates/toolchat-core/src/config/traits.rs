//! Configuration loader trait and errors

use std::path::PathBuf;

use super::file::ConfigFile;

/// Source of a `ConfigFile`
///
/// Implementations:
/// - `MemoryConfigLoader`: In-memory for testing
/// - `FileConfigLoader`: YAML file (~/.config/toolchat/config.yaml)
pub trait ConfigLoader: Send + Sync {
    /// Load the current configuration; a missing source yields an empty file
    fn load_config(&self) -> ConfigResult<ConfigFile>;
}

/// Load every loader in order, later ones overriding earlier sections
pub fn load_layered(loaders: &[&dyn ConfigLoader]) -> ConfigResult<ConfigFile> {
    loaders
        .iter()
        .try_fold(ConfigFile::default(), |merged, loader| {
            Ok(merged.overlay(loader.load_config()?))
        })
}

/// Errors that can occur during configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration section: {0}")]
    MissingSection(&'static str),

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Other(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
