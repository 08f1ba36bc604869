//! Path confinement and bounded subprocess execution.
//!
//! Two independent pieces live here. The [`PathValidator`] resolves
//! caller-supplied paths and decides whether they stay inside a configured
//! root. The [`ProcessRunner`] executes an already-approved command under a
//! hard wall-clock timeout, killing the whole process group on expiry so no
//! descendants are orphaned, and capturing stdout/stderr up to a byte cap.
//!
//! Neither component retains state across invocations.

#![warn(missing_docs, clippy::pedantic)]

mod path;
mod runner;

/// Path confinement types.
pub use path::{PathDecision, PathError, PathValidator};
/// Subprocess execution types.
pub use runner::{ProcessError, ProcessOutcome, ProcessRunner, RunnerConfig};
