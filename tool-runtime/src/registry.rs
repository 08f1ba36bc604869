//! Runtime registry mapping tool names to handlers.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tool_primitives::{ToolRequest, ToolResult};

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Trait implemented by tool handlers.
///
/// Handlers fold their own failures into the [`ToolResult`] envelope; the
/// registry never sees an error escape an invocation.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Handles one request, producing exactly one result.
    async fn invoke(&self, request: &ToolRequest) -> ToolResult;
}

/// Metadata describing a registered tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolMetadata {
    name: String,
    description: String,
}

impl ToolMetadata {
    /// Creates metadata for the supplied tool name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidMetadata`] if the name is empty.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> RegistryResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::InvalidMetadata {
                reason: "tool name cannot be empty".into(),
            });
        }

        Ok(Self {
            name,
            description: description.into(),
        })
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Handle returned by the registry for direct invocation.
#[derive(Clone)]
pub struct ToolHandle {
    metadata: ToolMetadata,
    handler: Arc<dyn Tool>,
}

impl ToolHandle {
    /// Returns the associated metadata.
    #[must_use]
    pub fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    /// Executes the underlying handler.
    pub async fn invoke(&self, request: &ToolRequest) -> ToolResult {
        self.handler.invoke(request).await
    }
}

/// Registry that stores tool handlers keyed by name.
#[derive(Default)]
pub struct ToolRegistry {
    inner: RwLock<HashMap<String, ToolHandle>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read().expect("tool registry poisoned");
        let names: Vec<_> = inner.keys().cloned().collect();
        f.debug_struct("ToolRegistry")
            .field("registered", &names)
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool handler.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTool`] if the name is already
    /// present.
    ///
    /// # Panics
    ///
    /// Panics if the internal registry lock is poisoned.
    pub fn register_tool<T>(&self, metadata: ToolMetadata, tool: T) -> RegistryResult<()>
    where
        T: Tool + 'static,
    {
        let mut inner = self.inner.write().expect("tool registry poisoned");
        let name = metadata.name().to_owned();
        if inner.contains_key(&name) {
            return Err(RegistryError::DuplicateTool { name });
        }

        inner.insert(
            name,
            ToolHandle {
                metadata,
                handler: Arc::new(tool),
            },
        );

        Ok(())
    }

    /// Returns a handle to the tool matching the supplied name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ToolHandle> {
        let inner = self.inner.read().ok()?;
        inner.get(name).cloned()
    }

    /// Lists the metadata of all registered tools, sorted by name.
    ///
    /// # Panics
    ///
    /// Panics if the internal registry lock is poisoned.
    #[must_use]
    pub fn list(&self) -> Vec<ToolMetadata> {
        let inner = self.inner.read().expect("tool registry poisoned");
        let mut listed: Vec<_> = inner
            .values()
            .map(|handle| handle.metadata.clone())
            .collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        listed
    }
}

/// Errors produced by tool registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Tool metadata failed validation.
    #[error("invalid tool metadata: {reason}")]
    InvalidMetadata {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Tool name collided with an existing registration.
    #[error("tool `{name}` is already registered")]
    DuplicateTool {
        /// Name of the offending tool.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        async fn invoke(&self, request: &ToolRequest) -> ToolResult {
            ToolResult::ok(json!({ "arguments": request.arguments() }))
        }
    }

    fn metadata(name: &str) -> ToolMetadata {
        ToolMetadata::new(name, "test tool").unwrap()
    }

    #[tokio::test]
    async fn register_and_invoke_tool() {
        let registry = ToolRegistry::new();
        registry.register_tool(metadata("echo"), Echo).unwrap();

        let request = ToolRequest::new("echo").with_argument("message", "hello");
        let handle = registry.get("echo").expect("registered handle");
        let result = handle.invoke(&request).await;

        assert!(result.is_success());
        assert_eq!(result.payload()["arguments"]["message"], "hello");
    }

    #[tokio::test]
    async fn duplicate_registration_errors() {
        let registry = ToolRegistry::new();
        registry.register_tool(metadata("echo"), Echo).unwrap();

        let err = registry
            .register_tool(metadata("echo"), Echo)
            .expect_err("duplicate registration should fail");
        assert!(matches!(err, RegistryError::DuplicateTool { name } if name == "echo"));
    }

    #[test]
    fn unknown_tool_is_absent() {
        let registry = ToolRegistry::new();
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn invalid_metadata_errors() {
        let err = ToolMetadata::new("", "whatever").expect_err("empty name should error");
        assert!(matches!(err, RegistryError::InvalidMetadata { .. }));
    }

    #[test]
    fn listing_is_sorted() {
        let registry = ToolRegistry::new();
        registry.register_tool(metadata("zeta"), Echo).unwrap();
        registry.register_tool(metadata("alpha"), Echo).unwrap();

        let names: Vec<_> = registry.list().into_iter().map(|m| m.name().to_owned()).collect();
        assert_eq!(names, ["alpha", "zeta"]);
    }
}
