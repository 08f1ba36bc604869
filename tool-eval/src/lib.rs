//! Restricted arithmetic expression evaluation.
//!
//! Expressions are lexed, parsed into an ephemeral tree, and folded to a
//! double-precision result. The identifier namespace is closed: every
//! recognized function and constant is enumerated here, and anything else is
//! rejected as an unknown identifier regardless of what it might resolve to
//! in the hosting process. There is no path from an expression to a
//! general-purpose interpreter, reflection, or host-symbol lookup.

#![warn(missing_docs, clippy::pedantic)]

mod ast;
mod error;
mod eval;
mod functions;
mod parser;
mod token;

/// Parse tree node types.
pub use ast::{BinaryOp, Expr, UnaryOp};
/// Evaluation errors and result alias.
pub use error::{EvalError, EvalResult};
/// The evaluator and the one-shot convenience entry point.
pub use eval::{Evaluator, evaluate};
/// Whitelist of callable functions and named constants.
pub use functions::FunctionSet;
