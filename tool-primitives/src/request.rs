//! Request envelope handed to the dispatch façade.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, RequestId, Result};

/// A single tool invocation: the tool name plus a JSON argument map.
///
/// Requests are immutable once built; the dispatcher evaluates each one from
/// scratch against static policy and never retains it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolRequest {
    id: RequestId,
    tool_name: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    arguments: Map<String, Value>,
}

impl ToolRequest {
    /// Creates a request for the named tool with no arguments.
    #[must_use]
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            id: RequestId::random(),
            tool_name: tool_name.into(),
            arguments: Map::new(),
        }
    }

    /// Creates a request carrying a pre-built argument map.
    #[must_use]
    pub fn with_arguments(tool_name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            id: RequestId::random(),
            tool_name: tool_name.into(),
            arguments,
        }
    }

    /// Adds an argument and returns the updated request.
    #[must_use]
    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// Returns the request identifier.
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Returns the requested tool name.
    #[must_use]
    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// Returns the full argument map.
    #[must_use]
    pub fn arguments(&self) -> &Map<String, Value> {
        &self.arguments
    }

    /// Extracts a required string argument.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingArgument`] when the argument is absent and
    /// [`Error::InvalidArgument`] when it is present but not a string.
    pub fn str_arg(&self, name: &str) -> Result<&str> {
        match self.arguments.get(name) {
            None => Err(Error::MissingArgument { name: name.into() }),
            Some(Value::String(value)) => Ok(value),
            Some(other) => Err(Error::InvalidArgument {
                name: name.into(),
                reason: format!("expected a string, got {other}"),
            }),
        }
    }

    /// Extracts an optional string argument.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when the argument is present but
    /// not a string.
    pub fn opt_str_arg(&self, name: &str) -> Result<Option<&str>> {
        match self.arguments.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(Some(value)),
            Some(other) => Err(Error::InvalidArgument {
                name: name.into(),
                reason: format!("expected a string, got {other}"),
            }),
        }
    }

    /// Extracts an optional unsigned integer argument.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when the argument is present but
    /// not an unsigned integer.
    pub fn opt_u64_arg(&self, name: &str) -> Result<Option<u64>> {
        match self.arguments.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value.as_u64().map(Some).ok_or_else(|| Error::InvalidArgument {
                name: name.into(),
                reason: format!("expected an unsigned integer, got {value}"),
            }),
        }
    }
}
