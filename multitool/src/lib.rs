//! Sandboxed utility-tool runtime facade.
//!
//! Depend on this crate via `cargo add multitool`. It bundles the internal
//! runtime crates behind feature flags so embedders can enable or disable
//! components as needed.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export the request/result envelope types for convenience.
pub use tool_primitives as primitives;

/// Command denylist filtering (enabled by `guard` feature).
#[cfg(feature = "guard")]
pub use tool_guard as guard;

/// Restricted arithmetic evaluation (enabled by `eval` feature).
#[cfg(feature = "eval")]
pub use tool_eval as eval;

/// Path confinement and bounded process execution (enabled by `sandbox`
/// feature).
#[cfg(feature = "sandbox")]
pub use tool_sandbox as sandbox;

/// Runtime configuration loading (enabled by `config` feature).
#[cfg(feature = "config")]
pub use tool_config as config;

/// Built-in utility operations (enabled by `builtins` feature).
#[cfg(feature = "builtins")]
pub use tool_builtins as builtins;

/// The dispatch façade and tool registry (enabled by `runtime` feature).
#[cfg(feature = "runtime")]
pub use tool_runtime as runtime;
