//! Current date and time.

use chrono::Local;

/// Format used for all caller-facing timestamps.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Returns the current local date and time as `YYYY-MM-DD HH:MM:SS`.
#[must_use]
pub fn current_time() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
