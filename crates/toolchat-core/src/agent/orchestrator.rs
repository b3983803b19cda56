//! Completion orchestrator
//!
//! One turn runs `ASSEMBLE -> FIRST_CALL -> (DONE | DISPATCH -> SECOND_CALL -> DONE)`
//! and then persists the turn's new messages when history is attached. Any
//! fault inside the turn becomes `AgentError::TurnFailed` and leaves history
//! untouched.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;

use super::assemble::{apply_system_instruction, pair_tool_exchanges, resolve_instruction};
use super::error::{AgentError, AgentResult, TurnPhase};
use super::options::ConverseOptions;
use crate::config::{AgentConfig, ConfigFile, HistorySettings};
use crate::history::{HistoryConfig, HistoryStore, ListStore, ReadOptions, RedisListStore};
use crate::logging::Logger;
use crate::providers::{
    create_provider, provider_to_secret_key, requires_api_key, CompletionProvider, ProviderError,
    ProviderSettings,
};
use crate::secrets::SecretStore;
use crate::tools::{dispatch, HandlerCatalog, RegistrySnapshot, ResolvedTools, ToolRegistry, ToolSource};
use crate::types::{
    CancellationToken, CompletionRequest, CompletionResponse, CompletionResult, Message, Usage,
};

/// Runs tool-augmented conversational turns against one provider
///
/// The agent can be shared across tasks; configuration methods take `&self`
/// and concurrent turns each see a consistent tool snapshot and store.
pub struct Agent {
    config: AgentConfig,
    provider: Arc<dyn CompletionProvider>,
    registry: Arc<ToolRegistry>,
    history: RwLock<Option<HistoryStore>>,
    logger: Arc<dyn Logger>,
}

/// State carried from assembly into the provider calls
struct PreparedTurn {
    request: CompletionRequest,
    user_message: Message,
    tools: Option<ResolvedTools>,
    history: Option<(HistoryStore, String)>,
}

impl Agent {
    /// Create an agent around an injected provider
    pub fn new(
        config: AgentConfig,
        provider: Arc<dyn CompletionProvider>,
        logger: Arc<dyn Logger>,
    ) -> AgentResult<Self> {
        if config.model.trim().is_empty() {
            return Err(AgentError::validation("model id is required"));
        }
        let registry = Arc::new(ToolRegistry::new(Arc::clone(&logger)));
        Ok(Self {
            config,
            provider,
            registry,
            history: RwLock::new(None),
            logger,
        })
    }

    /// Create an agent with a genai-backed provider
    ///
    /// The API key comes from `settings` if set, otherwise from `secrets`
    /// under the provider id and then its secret key name.
    pub fn from_settings(
        config: AgentConfig,
        mut settings: ProviderSettings,
        secrets: &dyn SecretStore,
        logger: Arc<dyn Logger>,
    ) -> AgentResult<Self> {
        if config.model.trim().is_empty() {
            return Err(AgentError::validation("model id is required"));
        }
        if settings.provider.trim().is_empty() {
            return Err(AgentError::validation("provider id is required"));
        }

        if settings.api_key.is_none() {
            settings.api_key = secrets
                .get(&settings.provider)
                .or_else(|| secrets.get(&provider_to_secret_key(&settings.provider)));
            if settings.api_key.is_some() {
                logger.debug(&format!(
                    "[Agent] API key for {} resolved from {} store",
                    settings.provider,
                    secrets.name()
                ));
            }
        }
        if settings.api_key.is_none() && requires_api_key(&settings.provider) {
            return Err(AgentError::MissingCredentials {
                provider: settings.provider,
            });
        }

        let provider = create_provider(settings, Arc::clone(&logger))?;
        Self::new(config, provider, logger)
    }

    /// Build an agent and apply the `tools` and `history` sections of a config file
    ///
    /// Directory tools are bound against `catalog`.
    pub fn from_config_file(
        file: &ConfigFile,
        secrets: &dyn SecretStore,
        catalog: HandlerCatalog,
        logger: Arc<dyn Logger>,
    ) -> AgentResult<Self> {
        let agent = Self::from_settings(
            file.agent_config()?.clone(),
            file.provider_settings()?.clone(),
            secrets,
            logger,
        )?;
        if let Some(tools) = &file.tools {
            agent.configure_tools(tools.path.clone(), catalog)?;
        }
        if let Some(history) = &file.history {
            agent.configure_history_from_settings(history)?;
        }
        Ok(agent)
    }

    /// Share an existing registry instead of the agent's own
    pub fn with_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn provider(&self) -> &Arc<dyn CompletionProvider> {
        &self.provider
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Load and validate tools from a directory of artifacts
    pub fn configure_tools(
        &self,
        path: impl Into<PathBuf>,
        catalog: HandlerCatalog,
    ) -> AgentResult<Arc<RegistrySnapshot>> {
        Ok(self.registry.load_directory(path, catalog)?)
    }

    /// Load and validate tools from any source
    pub fn configure_tool_source(&self, source: Arc<dyn ToolSource>) -> AgentResult<Arc<RegistrySnapshot>> {
        Ok(self.registry.load(source)?)
    }

    /// Attach a history store, replacing any previous one
    pub fn configure_history(&self, store: Arc<dyn ListStore>, config: HistoryConfig) {
        let history = HistoryStore::new(store, config, Arc::clone(&self.logger));
        *self.history.write() = Some(history);
        self.logger.info("[Agent] History store attached");
    }

    /// Attach a Redis-backed history store
    pub fn configure_history_from_settings(&self, settings: &HistorySettings) -> AgentResult<()> {
        let url = settings
            .redis_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| AgentError::validation("history store URL is required"))?;
        let store = RedisListStore::new(url)?;
        self.configure_history(
            Arc::new(store),
            HistoryConfig {
                default_read: settings.read.clone(),
            },
        );
        Ok(())
    }

    fn history_store(&self) -> Option<HistoryStore> {
        self.history.read().clone()
    }

    // ========================================================================
    // History access
    // ========================================================================

    /// A user's stored messages; empty when no store is attached
    pub async fn get_history(&self, user_id: &str, options: Option<ReadOptions>) -> AgentResult<Vec<Message>> {
        match self.history_store() {
            Some(store) => Ok(store.read(user_id, options.as_ref()).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Delete a user's stored messages, returning how many were removed
    pub async fn purge_history(&self, user_id: &str) -> AgentResult<usize> {
        let store = self.history_store().ok_or(AgentError::HistoryNotConfigured)?;
        Ok(store.purge(user_id).await?)
    }

    // ========================================================================
    // Turn
    // ========================================================================

    /// Run one conversational turn
    pub async fn converse(&self, message: impl Into<String>, options: ConverseOptions) -> AgentResult<CompletionResult> {
        let cancel = options.cancel.clone().unwrap_or_default();
        let turn = self
            .assemble(message.into(), &options, &cancel)
            .await
            .map_err(|e| self.fail(TurnPhase::Assemble, e))?;

        let mut request = turn.request;
        let (first, assistant) = self
            .call_provider(request.clone(), &cancel)
            .await
            .map_err(|e| self.fail(TurnPhase::FirstCall, e))?;

        let mut completion_messages = vec![turn.user_message, assistant.clone()];
        let mut raw_responses = vec![first];

        let tools = turn.tools.filter(|_| assistant.has_tool_calls());
        if let Some(tools) = tools {
            if cancel.is_cancelled() {
                return Err(self.fail(TurnPhase::Dispatch, ProviderError::Cancelled.into()));
            }
            let tool_messages = guard(&cancel, dispatch(assistant.calls(), &tools.implementations, &self.logger))
                .await
                .and_then(|r| r.map_err(Into::into))
                .map_err(|e| self.fail(TurnPhase::Dispatch, e))?;

            request.messages.push(assistant);
            request.messages.extend(tool_messages.iter().cloned());
            completion_messages.extend(tool_messages);

            let (second, final_message) = self
                .call_provider(request, &cancel)
                .await
                .map_err(|e| self.fail(TurnPhase::SecondCall, e))?;
            completion_messages.push(final_message);
            raw_responses.push(second);
        }

        let usage = Usage::aggregate(
            raw_responses[0].usage.as_ref(),
            raw_responses.get(1).and_then(|r| r.usage.as_ref()),
        );
        let choices = raw_responses.last().map(|r| r.choices()).unwrap_or_default();

        if let Some((store, user_id)) = &turn.history {
            guard(&cancel, store.append(user_id, &completion_messages))
                .await
                .and_then(|r| r.map_err(Into::into))
                .map_err(|e| self.fail(TurnPhase::Persist, e))?;
        }

        self.logger.info(&format!(
            "[Agent] Turn complete: {} provider call(s), {} total tokens",
            raw_responses.len(),
            usage.total_tokens
        ));
        Ok(CompletionResult {
            choices,
            usage,
            completion_messages,
            raw_responses,
        })
    }

    /// Build the first request of a turn
    async fn assemble(
        &self,
        message: String,
        options: &ConverseOptions,
        cancel: &CancellationToken,
    ) -> Result<PreparedTurn, BoxError> {
        let mut messages = self.config.messages.clone();

        let history = match (&options.history, self.history_store()) {
            (Some(conversation), Some(store)) => {
                let loaded = guard(cancel, store.read(&conversation.user_id, conversation.read.as_ref()))
                    .await??;
                let read = loaded.len();
                let loaded = pair_tool_exchanges(loaded);
                self.logger.debug(&format!(
                    "[Agent] Loaded {} history message(s) for {} ({} dropped from partial tool exchanges)",
                    loaded.len(),
                    conversation.user_id,
                    read - loaded.len()
                ));
                messages.extend(loaded);
                Some((store, conversation.user_id.clone()))
            }
            (Some(conversation), None) => {
                self.logger.warn(&format!(
                    "[Agent] History requested for {} but no store is configured",
                    conversation.user_id
                ));
                None
            }
            (None, _) => None,
        };

        let instruction = resolve_instruction(
            options.system_instruction.as_deref(),
            self.config.system_instruction.as_deref(),
        );
        apply_system_instruction(&mut messages, instruction);

        let user_message = Message::user(message);
        messages.push(user_message.clone());

        let tools = match options.requested_tools() {
            Some(names) => Some(self.registry.resolve(names)?),
            None => None,
        };

        let params = self.config.params.merged_with(&options.overrides);
        let request = CompletionRequest {
            model: self.config.effective_model(&options.overrides).to_string(),
            tool_choice: tools.as_ref().and(params.tool_choice.clone()),
            tools: tools.as_ref().map(|t| t.definitions.clone()),
            params,
            messages,
        };

        Ok(PreparedTurn {
            request,
            user_message,
            tools,
            history,
        })
    }

    /// Submit a request and take its first candidate
    async fn call_provider(
        &self,
        request: CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<(CompletionResponse, Message), BoxError> {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled.into());
        }
        let response = self.provider.complete(request, cancel.clone()).await?;
        let message = response
            .first_message()
            .cloned()
            .ok_or_else(|| ProviderError::empty_response(self.provider.name()))?;
        Ok((response, message))
    }

    fn fail(&self, phase: TurnPhase, source: BoxError) -> AgentError {
        let err = AgentError::turn_failed(phase, source);
        self.logger.error(&format!("[Agent] {}", err));
        err
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Await `fut` unless the turn is cancelled first
async fn guard<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output, BoxError> {
    cancel.run(fut).await.ok_or_else(|| ProviderError::Cancelled.into())
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("model", &self.config.model)
            .field("provider", &self.provider.name())
            .field("registry", &self.registry)
            .field("history", &self.history.read().is_some())
            .finish()
    }
}
