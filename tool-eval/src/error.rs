//! Evaluation error taxonomy.

use thiserror::Error;

/// Result alias for expression evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors produced while lexing, parsing, or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// The expression is syntactically malformed or non-finite.
    #[error("invalid expression at position {position}: {message}")]
    InvalidExpression {
        /// Byte offset of the offending token within the input.
        position: usize,
        /// Human-readable description of the problem.
        message: String,
    },

    /// Division or modulo with a zero right-hand side.
    #[error("division by zero")]
    DivisionByZero,

    /// An identifier outside the closed function/constant namespace.
    #[error("unknown identifier `{name}`")]
    UnknownIdentifier {
        /// The rejected identifier.
        name: String,
    },
}

impl EvalError {
    /// Creates an invalid-expression error at the given position.
    #[must_use]
    pub fn invalid(position: usize, message: impl Into<String>) -> Self {
        Self::InvalidExpression {
            position,
            message: message.into(),
        }
    }
}
