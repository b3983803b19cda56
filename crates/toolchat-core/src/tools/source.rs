//! Tool sources
//!
//! A source yields artifacts; each artifact exports named symbols that the
//! registry classifies as implementations or schema descriptors.
//!
//! - `StaticToolSource`: explicit registration at startup (preferred)
//! - `DirectoryToolSource`: scans `.json`/`.yaml`/`.yml` artifacts and binds
//!   `{handler: "<key>"}` exports to capabilities granted in a `HandlerCatalog`

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use super::definition::ToolDefinition;
use super::error::{ToolError, ToolResult};
use super::handler::ToolImplementation;

/// A single exported symbol
#[derive(Clone)]
pub enum ToolExport {
    /// Something invokable
    Implementation(Arc<dyn ToolImplementation>),
    /// Plain data; admitted as a schema when it has the descriptor shape
    Value(Value),
}

impl std::fmt::Debug for ToolExport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolExport::Implementation(_) => f.write_str("Implementation(..)"),
            ToolExport::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// One unit of a source (a file, or a registration batch)
#[derive(Debug, Clone)]
pub struct ToolArtifact {
    /// Where the artifact came from, used in error messages
    pub origin: String,
    /// Exported symbols in declaration order
    pub exports: Vec<(String, ToolExport)>,
}

impl ToolArtifact {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            exports: Vec::new(),
        }
    }
}

/// Something the registry can load tools from
pub trait ToolSource: Send + Sync {
    /// Human-readable location of this source
    fn describe(&self) -> String;

    /// Enumerate artifacts in load order
    fn artifacts(&self) -> ToolResult<Vec<ToolArtifact>>;
}

/// Tools registered explicitly by the caller
#[derive(Debug, Clone, Default)]
pub struct StaticToolSource {
    artifact: Vec<(String, ToolExport)>,
}

impl StaticToolSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition together with its implementation
    pub fn with_tool(mut self, definition: ToolDefinition, implementation: Arc<dyn ToolImplementation>) -> Self {
        let name = definition.name.clone();
        self.artifact
            .push((name.clone(), ToolExport::Value(definition.to_descriptor())));
        self.artifact
            .push((name, ToolExport::Implementation(implementation)));
        self
    }

    /// Register a raw export
    pub fn with_export(mut self, symbol: impl Into<String>, export: ToolExport) -> Self {
        self.artifact.push((symbol.into(), export));
        self
    }
}

impl ToolSource for StaticToolSource {
    fn describe(&self) -> String {
        "static".to_string()
    }

    fn artifacts(&self) -> ToolResult<Vec<ToolArtifact>> {
        Ok(vec![ToolArtifact {
            origin: self.describe(),
            exports: self.artifact.clone(),
        }])
    }
}

/// Implementations a directory source is allowed to bind to
#[derive(Clone, Default)]
pub struct HandlerCatalog {
    handlers: HashMap<String, Arc<dyn ToolImplementation>>,
}

impl HandlerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a handler under `key`
    pub fn grant(mut self, key: impl Into<String>, handler: Arc<dyn ToolImplementation>) -> Self {
        self.handlers.insert(key.into(), handler);
        self
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn ToolImplementation>> {
        self.handlers.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.handlers.keys().collect();
        keys.sort();
        f.debug_struct("HandlerCatalog").field("handlers", &keys).finish()
    }
}

/// Directory of tool artifacts
///
/// Only regular files with a `.json`, `.yaml` or `.yml` extension are read;
/// everything else is skipped. Files are visited in file-name order.
///
/// An artifact is a mapping of symbol to value:
///
/// ```yaml
/// get_weather:
///   handler: weather
/// get_weather_schema:
///   type: function
///   function:
///     name: get_weather
///     parameters: { type: object }
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryToolSource {
    path: PathBuf,
    catalog: HandlerCatalog,
}

impl DirectoryToolSource {
    pub fn new(path: impl Into<PathBuf>, catalog: HandlerCatalog) -> Self {
        Self {
            path: path.into(),
            catalog,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_artifact(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("json") | Some("yaml") | Some("yml")
        )
    }

    fn parse(path: &Path, content: &str) -> ToolResult<Value> {
        let parsed = if path.extension().and_then(|e| e.to_str()) == Some("json") {
            serde_json::from_str::<Value>(content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<Value>(content).map_err(|e| e.to_string())
        };
        parsed.map_err(|message| ToolError::Import {
            path: path.to_path_buf(),
            message,
        })
    }

    fn classify(&self, origin: &str, symbol: &str, value: Value) -> ToolResult<ToolExport> {
        if ToolDefinition::is_descriptor(&value) {
            return Ok(ToolExport::Value(value));
        }
        match value.get("handler") {
            None => Ok(ToolExport::Value(value)),
            Some(Value::String(key)) => self
                .catalog
                .get(key)
                .map(ToolExport::Implementation)
                .ok_or_else(|| {
                    ToolError::invalid_tool(origin, symbol, format!("handler '{key}' is not granted"))
                }),
            Some(_) => Err(ToolError::invalid_tool(origin, symbol, "handler must be a string")),
        }
    }

    fn read_artifact(&self, path: &Path) -> ToolResult<ToolArtifact> {
        let content = fs::read_to_string(path).map_err(|source| ToolError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let origin = path.display().to_string();

        let exports = match Self::parse(path, &content)? {
            Value::Object(map) => map,
            Value::Null => Default::default(),
            _ => {
                return Err(ToolError::Import {
                    path: path.to_path_buf(),
                    message: "artifact must be a mapping of exported symbols".to_string(),
                })
            }
        };

        let mut artifact = ToolArtifact::new(origin.clone());
        for (symbol, value) in exports {
            let export = self.classify(&origin, &symbol, value)?;
            artifact.exports.push((symbol, export));
        }
        Ok(artifact)
    }
}

impl ToolSource for DirectoryToolSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn artifacts(&self) -> ToolResult<Vec<ToolArtifact>> {
        let access = |source| ToolError::DirectoryAccess {
            path: self.path.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.path).map_err(access)? {
            let entry = entry.map_err(access)?;
            let is_file = entry.file_type().map_err(access)?.is_file();
            let path = entry.path();
            if is_file && Self::is_artifact(&path) {
                files.push(path);
            }
        }
        files.sort();

        files.iter().map(|path| self.read_artifact(path)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::handler::sync_tool_fn;
    use serde_json::json;
    use tempfile::tempdir;

    fn catalog() -> HandlerCatalog {
        HandlerCatalog::new().grant("echo", sync_tool_fn(|args| Ok(Some(args))))
    }

    #[test]
    fn test_static_source_exports_pairs() {
        let source = StaticToolSource::new().with_tool(
            ToolDefinition::new("echo"),
            sync_tool_fn(|args| Ok(Some(args))),
        );
        let artifacts = source.artifacts().unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].exports.len(), 2);
        assert!(matches!(artifacts[0].exports[1].1, ToolExport::Implementation(_)));
    }

    #[test]
    fn test_directory_source_reads_artifacts() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("echo.yaml"),
            "echo:\n  handler: echo\necho_schema:\n  type: function\n  function:\n    name: echo\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let source = DirectoryToolSource::new(dir.path(), catalog());
        let artifacts = source.artifacts().unwrap();
        assert_eq!(artifacts.len(), 1);

        let exports = &artifacts[0].exports;
        assert_eq!(exports.len(), 2);
        let kinds: Vec<bool> = exports
            .iter()
            .map(|(_, e)| matches!(e, ToolExport::Implementation(_)))
            .collect();
        assert_eq!(kinds, vec![true, false]);
    }

    #[test]
    fn test_artifacts_sorted_by_file_name() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.json"), r#"{"x": 1}"#).unwrap();
        fs::write(dir.path().join("a.json"), r#"{"y": 2}"#).unwrap();

        let source = DirectoryToolSource::new(dir.path(), catalog());
        let origins: Vec<String> = source
            .artifacts()
            .unwrap()
            .into_iter()
            .map(|a| a.origin)
            .collect();
        assert!(origins[0].ends_with("a.json"));
        assert!(origins[1].ends_with("b.json"));
    }

    #[test]
    fn test_missing_directory() {
        let source = DirectoryToolSource::new("/definitely/not/here", catalog());
        assert!(matches!(source.artifacts(), Err(ToolError::DirectoryAccess { .. })));
    }

    #[test]
    fn test_unparseable_artifact() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
        let source = DirectoryToolSource::new(dir.path(), catalog());
        assert!(matches!(source.artifacts(), Err(ToolError::Import { .. })));

        fs::write(dir.path().join("broken.json"), "[1, 2]").unwrap();
        assert!(matches!(source.artifacts(), Err(ToolError::Import { .. })));
    }

    #[test]
    fn test_ungranted_handler() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("tools.json"), json!({ "rm": { "handler": "shell" } }).to_string()).unwrap();
        let source = DirectoryToolSource::new(dir.path(), catalog());
        let err = source.artifacts().unwrap_err();
        assert!(matches!(err, ToolError::InvalidTool { ref symbol, .. } if symbol == "rm"));
    }
}
