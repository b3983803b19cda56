//! Environment variable secret store

use std::collections::HashMap;
use std::env;

use once_cell::sync::Lazy;

use super::traits::SecretStore;

/// Mapping from provider names to environment variable names
static ENV_VAR_MAP: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("openai", vec!["OPENAI_API_KEY"]);
    m.insert("anthropic", vec!["ANTHROPIC_API_KEY"]);
    m.insert("gemini", vec!["GEMINI_API_KEY", "GOOGLE_API_KEY"]);
    m.insert("google", vec!["GEMINI_API_KEY", "GOOGLE_API_KEY"]);
    m.insert("mistral", vec!["MISTRAL_API_KEY"]);
    m.insert("azure", vec!["AZURE_API_KEY", "AZURE_OPENAI_API_KEY"]);
    m.insert("openrouter", vec!["OPENROUTER_API_KEY"]);
    m.insert("ollama", vec![]);
    m
});

/// Read-only store backed by the process environment
///
/// A key is tried as a variable name first, then through the provider
/// mapping above, then as `<KEY>_API_KEY`. Empty values count as unset.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn new() -> Self {
        Self
    }

    /// Get the environment variable names for a provider
    pub fn env_vars_for_provider(provider: &str) -> Option<&'static [&'static str]> {
        ENV_VAR_MAP.get(provider.to_lowercase().as_str()).map(|v| v.as_slice())
    }

    fn non_empty(name: &str) -> Option<String> {
        env::var(name).ok().filter(|v| !v.is_empty())
    }
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        Self::non_empty(key)
            .or_else(|| {
                Self::env_vars_for_provider(key)?
                    .iter()
                    .find_map(|var| Self::non_empty(var))
            })
            .or_else(|| Self::non_empty(&format!("{}_API_KEY", key.to_uppercase())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::SecretStoreError;

    #[test]
    fn test_env_store_read_only() {
        let store = EnvSecretStore::new();
        assert_eq!(store.name(), "env");
        assert!(matches!(store.store("test", "value"), Err(SecretStoreError::ReadOnly)));
    }

    #[test]
    fn test_env_store_get_direct() {
        env::set_var("TOOLCHAT_TEST_SECRET_DIRECT", "test_value");
        let store = EnvSecretStore::new();
        assert_eq!(store.get("TOOLCHAT_TEST_SECRET_DIRECT"), Some("test_value".to_string()));
        env::remove_var("TOOLCHAT_TEST_SECRET_DIRECT");
    }

    #[test]
    fn test_env_store_get_by_suffix() {
        env::set_var("TOOLCHAT_ACME_API_KEY", "sk-acme");
        let store = EnvSecretStore::new();
        assert_eq!(store.get("toolchat_acme"), Some("sk-acme".to_string()));
        env::remove_var("TOOLCHAT_ACME_API_KEY");
    }

    #[test]
    fn test_env_store_empty_is_unset() {
        env::set_var("TOOLCHAT_TEST_SECRET_EMPTY", "");
        let store = EnvSecretStore::new();
        assert!(!store.has("TOOLCHAT_TEST_SECRET_EMPTY"));
        env::remove_var("TOOLCHAT_TEST_SECRET_EMPTY");
    }

    #[test]
    fn test_provider_mapping() {
        assert_eq!(
            EnvSecretStore::env_vars_for_provider("Gemini"),
            Some(&["GEMINI_API_KEY", "GOOGLE_API_KEY"][..])
        );
        assert_eq!(EnvSecretStore::env_vars_for_provider("ollama"), Some(&[][..]));
        assert!(EnvSecretStore::env_vars_for_provider("nonexistent_provider_xyz").is_none());
    }
}
