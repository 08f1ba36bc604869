//! Core shared types for the multitool runtime.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod ids;
mod request;
mod result;

/// Error type and result alias shared across the runtime.
pub use error::{Error, Result};
/// Unique identifier attached to each tool invocation.
pub use ids::RequestId;
/// Immutable request envelope handed to the dispatcher.
pub use request::ToolRequest;
/// Normalized response envelope produced exactly once per request.
pub use result::ToolResult;
