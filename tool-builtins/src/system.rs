//! Host introspection.
//!
//! Reports only facts derivable from the standard library. Deep metrics
//! (CPU load, memory, disk usage) are a separate collector outside this
//! runtime.

use serde_json::{Value, json};

/// Returns basic facts about the host this runtime executes on.
#[must_use]
pub fn system_info() -> Value {
    json!({
        "os": std::env::consts::OS,
        "arch": std::env::consts::ARCH,
        "family": std::env::consts::FAMILY,
        "cpu_count": std::thread::available_parallelism().map_or(0, std::num::NonZero::get),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_the_compile_target() {
        let info = system_info();
        assert_eq!(info["os"], std::env::consts::OS);
        assert!(info["cpu_count"].as_u64().unwrap() >= 1);
    }
}
