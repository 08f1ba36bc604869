//! Configuration for the multitool runtime.
//!
//! Policy lives in configuration, not code: the sandbox root, command
//! timeout, output caps, extra deny rules, the evaluator function whitelist,
//! and the weather credentials are all loaded from a TOML file and can be
//! overridden through `MULTITOOL_*` environment variables.

#![warn(missing_docs, clippy::pedantic)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tool_guard::RuleSpec;
use tracing::debug;

/// Default command timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default per-stream output cap in bytes.
const DEFAULT_MAX_OUTPUT_BYTES: usize = 64 * 1024;

/// Default OpenWeatherMap endpoint.
const DEFAULT_WEATHER_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file `{path}`: {source}")]
    Io {
        /// Path of the file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse config file `{path}`: {source}")]
    Parse {
        /// Path of the file that failed.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// An environment override carried an unusable value.
    #[error("invalid value for `{key}`: {reason}")]
    InvalidOverride {
        /// Environment variable name.
        key: String,
        /// Human-readable reason for rejection.
        reason: String,
    },
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Weather lookup settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key; lookups fail with a structured error when
    /// absent.
    pub api_key: Option<String>,
    /// Endpoint for the current-conditions API.
    pub endpoint: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_WEATHER_ENDPOINT.into(),
        }
    }
}

/// Full runtime configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Root directory all file operations and working directories are
    /// confined to.
    pub sandbox_root: PathBuf,
    /// Wall-clock timeout for one command, in seconds.
    pub command_timeout_secs: u64,
    /// Per-stream stdout/stderr capture cap, in bytes.
    pub max_output_bytes: usize,
    /// Deny rules appended after the built-in guard table.
    pub deny_rules: Vec<RuleSpec>,
    /// When set, restricts the evaluator to this subset of its built-in
    /// functions. Names outside the built-in whitelist are ignored.
    pub functions: Option<Vec<String>>,
    /// Weather lookup settings.
    pub weather: WeatherConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            sandbox_root: PathBuf::from("."),
            command_timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            deny_rules: Vec::new(),
            functions: None,
            weather: WeatherConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Loads configuration: the file when given, defaults otherwise, then
    /// environment overrides on top.
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigError`] from file reading, parsing, or malformed
    /// environment values.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parses configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it does not match the schema.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded runtime config");
        Ok(config)
    }

    /// Applies environment overrides using the supplied lookup.
    ///
    /// Recognized keys: `MULTITOOL_SANDBOX_ROOT`,
    /// `MULTITOOL_COMMAND_TIMEOUT_SECS`, `MULTITOOL_MAX_OUTPUT_BYTES`, and
    /// `OPENWEATHER_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] for unparsable numeric
    /// values.
    pub fn apply_env_overrides(
        &mut self,
        get: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<()> {
        if let Some(root) = get("MULTITOOL_SANDBOX_ROOT") {
            self.sandbox_root = PathBuf::from(root);
        }

        if let Some(raw) = get("MULTITOOL_COMMAND_TIMEOUT_SECS") {
            self.command_timeout_secs =
                raw.parse().map_err(|_| ConfigError::InvalidOverride {
                    key: "MULTITOOL_COMMAND_TIMEOUT_SECS".into(),
                    reason: format!("`{raw}` is not a number of seconds"),
                })?;
        }

        if let Some(raw) = get("MULTITOOL_MAX_OUTPUT_BYTES") {
            self.max_output_bytes = raw.parse().map_err(|_| ConfigError::InvalidOverride {
                key: "MULTITOOL_MAX_OUTPUT_BYTES".into(),
                reason: format!("`{raw}` is not a byte count"),
            })?;
        }

        if let Some(key) = get("OPENWEATHER_API_KEY") {
            self.weather.api_key = Some(key);
        }

        Ok(())
    }

    /// Returns the command timeout as a [`Duration`].
    #[must_use]
    pub const fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}
