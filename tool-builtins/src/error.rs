//! Error taxonomy for the builtin handlers.

use thiserror::Error;

/// Errors produced by the builtin utility operations.
#[derive(Debug, Error)]
pub enum BuiltinError {
    /// The requested path resolves outside the sandbox root.
    #[error("path `{path}` is outside the permitted root")]
    PathOutOfBounds {
        /// The path as requested by the caller.
        path: String,
    },

    /// The requested path does not exist.
    #[error("path `{path}` does not exist")]
    NotFound {
        /// The path as requested by the caller.
        path: String,
    },

    /// A directory operation was pointed at something else.
    #[error("path `{path}` is not a directory")]
    NotADirectory {
        /// The path as requested by the caller.
        path: String,
    },

    /// Filesystem operation failed after validation.
    #[error("i/o failure: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Weather lookups require an API key.
    #[error("weather api key is not configured")]
    MissingApiKey,

    /// The weather service rejected the request or answered unusably.
    #[error("weather lookup failed: {reason}")]
    Weather {
        /// Human-readable failure description.
        reason: String,
    },
}
