//! File-based configuration (YAML)
//!
//! Supports user-level (~/.config/toolchat/config.yaml) and workspace-level
//! (.config/toolchat/config.yaml) files.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::agent::AgentConfig;
use super::traits::{ConfigError, ConfigLoader, ConfigResult};
use crate::history::ReadOptions;
use crate::providers::ProviderSettings;

/// Configuration file structure
///
/// Every section is optional so user and workspace files can each carry a
/// subset; see `overlay`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<HistorySettings>,
}

/// Where tool artifacts are loaded from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsSettings {
    pub path: PathBuf,
}

/// History store connection and read defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySettings {
    /// Redis URL, e.g. `redis://127.0.0.1/`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redis_url: Option<String>,

    /// Options applied to reads that pass none
    #[serde(default)]
    pub read: ReadOptions,
}

impl ConfigFile {
    /// Layer `other` on top of `self`, section by section
    pub fn overlay(self, other: ConfigFile) -> ConfigFile {
        ConfigFile {
            agent: other.agent.or(self.agent),
            provider: other.provider.or(self.provider),
            tools: other.tools.or(self.tools),
            history: other.history.or(self.history),
        }
    }

    /// The agent section, which every usable configuration needs
    pub fn agent_config(&self) -> ConfigResult<&AgentConfig> {
        self.agent.as_ref().ok_or(ConfigError::MissingSection("agent"))
    }

    /// The provider section, which every usable configuration needs
    pub fn provider_settings(&self) -> ConfigResult<&ProviderSettings> {
        self.provider.as_ref().ok_or(ConfigError::MissingSection("provider"))
    }
}

/// Config level (user or workspace)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLevel {
    /// User-level config (~/.config/toolchat/config.yaml)
    User,
    /// Workspace-level config (.config/toolchat/config.yaml in workspace root)
    Workspace,
}

impl ConfigLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLevel::User => "user",
            ConfigLevel::Workspace => "workspace",
        }
    }
}

/// YAML configuration loader with a read cache
///
/// # Example
///
/// ```no_run
/// use toolchat_core::config::{load_layered, FileConfigLoader};
///
/// let user = FileConfigLoader::user();
/// let workspace = FileConfigLoader::workspace("/path/to/workspace");
/// let config = load_layered(&[&user, &workspace]).unwrap();
/// ```
pub struct FileConfigLoader {
    path: PathBuf,
    level: ConfigLevel,
    cache: RwLock<Option<ConfigFile>>,
}

impl FileConfigLoader {
    pub fn new(path: impl Into<PathBuf>, level: ConfigLevel) -> Self {
        Self {
            path: path.into(),
            level,
            cache: RwLock::new(None),
        }
    }

    /// User-level loader (~/.config/toolchat/config.yaml)
    pub fn user() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("toolchat").join("config.yaml"), ConfigLevel::User)
    }

    /// Workspace-level loader (.config/toolchat/config.yaml)
    pub fn workspace(workspace_root: impl AsRef<Path>) -> Self {
        let path = workspace_root.as_ref().join(".config").join("toolchat").join("config.yaml");
        Self::new(path, ConfigLevel::Workspace)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn level(&self) -> ConfigLevel {
        self.level
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn read_file(&self) -> ConfigResult<ConfigFile> {
        if !self.path.exists() {
            return Ok(ConfigFile::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ConfigFile::default());
        }
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Write `config` to disk, creating parent directories
    pub fn save(&self, config: &ConfigFile) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(config)
            .map_err(|e| ConfigError::Other(format!("Failed to serialize YAML: {}", e)))?;
        fs::write(&self.path, content)?;

        *self.cache.write() = Some(config.clone());
        Ok(())
    }

    /// Reload config from disk (invalidate cache)
    pub fn reload(&self) -> ConfigResult<ConfigFile> {
        let config = self.read_file()?;
        *self.cache.write() = Some(config.clone());
        Ok(config)
    }
}

impl ConfigLoader for FileConfigLoader {
    fn load_config(&self) -> ConfigResult<ConfigFile> {
        if let Some(config) = self.cache.read().as_ref() {
            return Ok(config.clone());
        }
        self.reload()
    }
}

impl std::fmt::Debug for FileConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigLoader")
            .field("path", &self.path)
            .field("level", &self.level)
            .field("exists", &self.exists())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_layered, MemoryConfigLoader};
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
agent:
  model: gpt-4o-mini
  system_instruction: You are terse.
  params:
    temperature: 0.2
    max_tokens: 256
provider:
  provider: openai
tools:
  path: ./tools
history:
  redis_url: redis://127.0.0.1/
  read:
    limit: 20
    exclude_tool_messages: true
"#;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let loader = FileConfigLoader::new(dir.path().join("config.yaml"), ConfigLevel::User);
        assert!(!loader.exists());
        assert_eq!(loader.load_config().unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_parse_full_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, SAMPLE).unwrap();

        let config = FileConfigLoader::new(&path, ConfigLevel::User).load_config().unwrap();
        let agent = config.agent_config().unwrap();
        assert_eq!(agent.model, "gpt-4o-mini");
        assert_eq!(agent.params.max_tokens, Some(256));
        assert_eq!(config.provider_settings().unwrap().provider, "openai");
        assert_eq!(config.tools.unwrap().path, PathBuf::from("./tools"));

        let history = config.history.unwrap();
        assert_eq!(history.read.limit, Some(20));
        assert!(history.read.exclude_tool_messages);
    }

    #[test]
    fn test_parse_error_names_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "agent: [not, a, mapping").unwrap();

        let err = FileConfigLoader::new(&path, ConfigLevel::User).load_config().unwrap_err();
        assert!(matches!(err, ConfigError::Parse { path: ref p, .. } if p == &path));
    }

    #[test]
    fn test_cache_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let loader = FileConfigLoader::new(&path, ConfigLevel::Workspace);
        assert!(loader.load_config().unwrap().agent.is_none());

        fs::write(&path, "agent:\n  model: llama3\n").unwrap();
        // Cached empty config until reload
        assert!(loader.load_config().unwrap().agent.is_none());
        assert_eq!(loader.reload().unwrap().agent_config().unwrap().model, "llama3");
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = tempdir().unwrap();
        let loader = FileConfigLoader::workspace(dir.path());
        let config = ConfigFile {
            agent: Some(AgentConfig::new("gpt-4o")),
            provider: Some(ProviderSettings::new("openai")),
            ..ConfigFile::default()
        };
        loader.save(&config).unwrap();
        assert!(loader.exists());

        let content = fs::read_to_string(loader.path()).unwrap();
        assert!(content.contains("gpt-4o"));
        assert_eq!(loader.reload().unwrap(), config);
    }

    #[test]
    fn test_layered_workspace_wins() {
        let user = MemoryConfigLoader::new(ConfigFile {
            agent: Some(AgentConfig::new("user-model")),
            provider: Some(ProviderSettings::new("openai")),
            ..ConfigFile::default()
        });
        let workspace = MemoryConfigLoader::new(ConfigFile {
            agent: Some(AgentConfig::new("workspace-model")),
            ..ConfigFile::default()
        });

        let merged = load_layered(&[&user, &workspace]).unwrap();
        assert_eq!(merged.agent_config().unwrap().model, "workspace-model");
        assert_eq!(merged.provider_settings().unwrap().provider, "openai");
        assert!(matches!(merged.tools, None));
    }
}
