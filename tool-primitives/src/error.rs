//! Shared error definitions for runtime primitives.

use thiserror::Error;
use uuid::Error as UuidError;

/// Result alias used throughout the runtime primitives.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// The provided request identifier could not be parsed.
    #[error("invalid request id: {source}")]
    InvalidRequestId {
        /// Source parsing error from the UUID library.
        #[from]
        source: UuidError,
    },

    /// A required argument was absent from the request.
    #[error("missing required argument `{name}`")]
    MissingArgument {
        /// Name of the absent argument.
        name: String,
    },

    /// An argument was present but carried an unusable value.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the offending argument.
        name: String,
        /// Human-readable reason for rejection.
        reason: String,
    },
}
