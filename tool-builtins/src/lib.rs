//! Built-in utility operations exposed through the dispatch façade.
//!
//! Everything filesystem-shaped goes through the path validator before any
//! I/O happens; the handlers here never touch a path the validator has not
//! approved.

#![warn(missing_docs, clippy::pedantic)]

mod clock;
mod error;
mod files;
mod system;
mod weather;

/// Current-time formatting.
pub use clock::current_time;
/// Error type shared by the builtin handlers.
pub use error::BuiltinError;
/// Confined file operations.
pub use files::FileTools;
/// Host introspection.
pub use system::system_info;
/// Weather lookup client.
pub use weather::WeatherClient;
