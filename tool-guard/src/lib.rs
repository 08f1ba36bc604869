//! Denylist filtering for caller-supplied shell commands.
//!
//! The guard classifies a command string as allowed or denied by scanning an
//! ordered table of pattern rules; the first matching rule denies. Rules are
//! plain data (deserializable from configuration) so the policy can be
//! audited and extended without touching execution logic.
//!
//! This is risk reduction, not a security boundary: a denylist reduces
//! common misuse but cannot guarantee against malicious command execution.
//! Deployments that need a real trust boundary must layer OS-level isolation
//! (namespaces, seccomp, containers) underneath.

#![warn(missing_docs, clippy::pedantic)]

mod decision;
mod guard;
mod rule;

/// Verdict returned by the guard for one command string.
pub use decision::CommandDecision;
/// The guard itself plus its error and result aliases.
pub use guard::{CommandGuard, GuardError, GuardResult};
/// Rule representations: compiled rules and their serializable specs.
pub use rule::{DenyRule, MatchKind, RuleSpec};
