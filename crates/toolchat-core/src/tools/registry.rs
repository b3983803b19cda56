//! Tool registry
//!
//! The ToolRegistry is the central component for:
//! - Loading tool definitions and implementations from a `ToolSource`
//! - Validating that every definition has exactly one implementation
//! - Publishing an immutable snapshot that resolvers read without blocking loads
//! - Resolving a requested subset of tools for a turn

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use super::definition::ToolDefinition;
use super::error::{ToolError, ToolResult};
use super::handler::ToolImplementation;
use super::source::{DirectoryToolSource, HandlerCatalog, ToolExport, ToolSource};
use crate::logging::Logger;

/// Name → implementation map
pub type ImplementationMap = HashMap<String, Arc<dyn ToolImplementation>>;

/// Immutable view of the registry at one point in time
pub struct RegistrySnapshot {
    definitions: Vec<ToolDefinition>,
    implementations: ImplementationMap,
}

impl RegistrySnapshot {
    /// Definitions in load order
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    pub fn implementations(&self) -> &ImplementationMap {
        &self.implementations
    }

    pub fn names(&self) -> Vec<String> {
        self.definitions.iter().map(|d| d.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl std::fmt::Debug for RegistrySnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrySnapshot")
            .field("tools", &self.names())
            .finish()
    }
}

/// Tools selected for one turn
#[derive(Clone)]
pub struct ResolvedTools {
    /// Schemas of the requested tools, in request order
    pub definitions: Vec<ToolDefinition>,
    /// Every implementation of the snapshot
    pub implementations: ImplementationMap,
}

impl std::fmt::Debug for ResolvedTools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedTools")
            .field("definitions", &self.definitions)
            .field("implementations", &self.implementations.len())
            .finish()
    }
}

/// Registry holding the active tool snapshot
///
/// `load` builds and validates a complete snapshot before swapping it in, so
/// concurrent `resolve` calls see either the old or the new snapshot, never
/// a partial one. A failed load leaves the previous snapshot active.
pub struct ToolRegistry {
    /// Active snapshot
    active: RwLock<Option<Arc<RegistrySnapshot>>>,
    /// Last configured source, used for lazy loading
    source: RwLock<Option<Arc<dyn ToolSource>>>,
    logger: Arc<dyn Logger>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            active: RwLock::new(None),
            source: RwLock::new(None),
            logger,
        }
    }

    /// Record a source without loading it; the first `resolve` loads it
    pub fn set_source(&self, source: Arc<dyn ToolSource>) {
        *self.source.write() = Some(source);
    }

    /// Load a directory source
    pub fn load_directory(
        &self,
        path: impl Into<PathBuf>,
        catalog: HandlerCatalog,
    ) -> ToolResult<Arc<RegistrySnapshot>> {
        self.load(Arc::new(DirectoryToolSource::new(path, catalog)))
    }

    /// Load, validate and publish a new snapshot from `source`
    pub fn load(&self, source: Arc<dyn ToolSource>) -> ToolResult<Arc<RegistrySnapshot>> {
        self.set_source(Arc::clone(&source));
        self.logger.info(&format!(
            "[ToolRegistry] Loading tools from {}",
            source.describe()
        ));

        let snapshot = match self.build_snapshot(source.as_ref()) {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                self.logger.error(&format!("[ToolRegistry] Load failed: {}", e));
                return Err(e);
            }
        };

        *self.active.write() = Some(Arc::clone(&snapshot));
        self.logger.info(&format!(
            "[ToolRegistry] Published {} tool(s)",
            snapshot.len()
        ));
        Ok(snapshot)
    }

    fn build_snapshot(&self, source: &dyn ToolSource) -> ToolResult<RegistrySnapshot> {
        let mut definitions: Vec<ToolDefinition> = Vec::new();
        let mut implementations = ImplementationMap::new();

        for artifact in source.artifacts()? {
            for (symbol, export) in artifact.exports {
                match export {
                    ToolExport::Implementation(implementation) => {
                        if implementations.insert(symbol.clone(), implementation).is_some() {
                            self.logger.warn(&format!(
                                "[ToolRegistry] Implementation '{}' redefined in {}, last one wins",
                                symbol, artifact.origin
                            ));
                        }
                    }
                    ToolExport::Value(value) => {
                        let Some(definition) = Self::admit_schema(&value)? else {
                            self.logger.debug(&format!(
                                "[ToolRegistry] Skipping non-tool export '{}' in {}",
                                symbol, artifact.origin
                            ));
                            continue;
                        };
                        match definitions.iter_mut().find(|d| d.name == definition.name) {
                            Some(existing) => {
                                self.logger.warn(&format!(
                                    "[ToolRegistry] Definition '{}' redefined in {}, last one wins",
                                    definition.name, artifact.origin
                                ));
                                *existing = definition;
                            }
                            None => definitions.push(definition),
                        }
                    }
                }
            }
        }

        if definitions.len() != implementations.len() {
            return Err(ToolError::CountMismatch {
                definitions: definitions.len(),
                implementations: implementations.len(),
            });
        }

        let missing: Vec<String> = definitions
            .iter()
            .filter(|d| !implementations.contains_key(&d.name))
            .map(|d| d.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(ToolError::MissingImplementation { names: missing });
        }

        Ok(RegistrySnapshot {
            definitions,
            implementations,
        })
    }

    fn admit_schema(value: &Value) -> ToolResult<Option<ToolDefinition>> {
        if !ToolDefinition::is_descriptor(value) {
            return Ok(None);
        }
        ToolDefinition::from_descriptor(value).map(Some)
    }

    /// The active snapshot, if any load has succeeded
    pub fn snapshot(&self) -> Option<Arc<RegistrySnapshot>> {
        self.active.read().clone()
    }

    /// Names of all tools in the active snapshot
    pub fn tool_names(&self) -> Vec<String> {
        self.snapshot().map(|s| s.names()).unwrap_or_default()
    }

    /// Look up `names` in the active snapshot, loading lazily if needed
    ///
    /// Every missing name is reported, not only the first.
    pub fn resolve(&self, names: &[String]) -> ToolResult<ResolvedTools> {
        let snapshot = match self.snapshot() {
            Some(snapshot) => snapshot,
            None => {
                let source = self.source.read().clone().ok_or(ToolError::NoSource)?;
                self.logger.debug("[ToolRegistry] No snapshot yet, loading lazily");
                self.load(source)?
            }
        };

        let mut seen = HashSet::new();
        let mut definitions = Vec::new();
        let mut missing = Vec::new();
        for name in names {
            if !seen.insert(name.as_str()) {
                continue;
            }
            match snapshot.definitions.iter().find(|d| &d.name == name) {
                Some(definition) => definitions.push(definition.clone()),
                None => missing.push(name.clone()),
            }
        }

        if !missing.is_empty() {
            return Err(ToolError::NotFound { names: missing });
        }

        Ok(ResolvedTools {
            definitions,
            implementations: snapshot.implementations.clone(),
        })
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}
