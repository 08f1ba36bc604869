//! The dispatch façade: one uniform entry point over the tool catalog.
//!
//! A [`Dispatcher`] owns a [`registry::ToolRegistry`] wired to the sandbox
//! components: the command guard in front of the process runner, the path
//! validator in front of every file operation, and the closed-grammar
//! evaluator for arithmetic. Each request is resolved to exactly one
//! normalized [`tool_primitives::ToolResult`]; nothing here panics on
//! caller input.

#![warn(missing_docs, clippy::pedantic)]

mod dispatch;
mod handlers;
pub mod registry;
pub mod telemetry;

/// The façade and its construction error.
pub use dispatch::{DispatchError, Dispatcher};
