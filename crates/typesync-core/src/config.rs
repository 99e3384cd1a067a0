//! Configuration types for the type synchronization system
//!
//! Configuration is loaded once from a JSON file in the working directory
//! (`ts-openapi.config.json`) and treated as immutable for the lifetime of
//! the process. The file uses the upper-case key names of the original
//! tooling (`PORT`, `NODE_ENV`, ...), mapped onto idiomatic field names here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fixed relative path of the configuration file
pub const CONFIG_FILE_NAME: &str = "ts-openapi.config.json";

/// Output extensions recognized as TypeScript type definitions
const TYPE_DEFINITION_EXTENSIONS: &[&str] = &[".ts", ".mts", ".cts"];

/// Main typesync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Preferred port for the types server
    #[serde(rename = "PORT")]
    pub port: u16,

    /// Runtime environment
    #[serde(rename = "NODE_ENV")]
    pub environment: Environment,

    /// Log verbosity (winston-style level ladder)
    #[serde(rename = "LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Absolute http/https URL of the OpenAPI document
    #[serde(rename = "OPENAPI_SPEC_URL")]
    pub spec_url: String,

    /// Path the generated type definitions are written to
    #[serde(rename = "OUTPUT_FILE_PATH")]
    pub output_path: String,

    /// Periodic regeneration interval in milliseconds
    ///
    /// When present, the periodic trigger is used and file watching is
    /// disabled.
    #[serde(rename = "UPDATE_INTERVAL", skip_serializing_if = "Option::is_none")]
    pub update_interval_ms: Option<u64>,

    /// Directory to watch for changes (defaults to the working directory)
    ///
    /// Only consulted when `UPDATE_INTERVAL` is absent.
    #[serde(rename = "WATCH_DIR", skip_serializing_if = "Option::is_none")]
    pub watch_dir: Option<String>,
}

impl Config {
    /// Load and validate the configuration from a JSON file
    ///
    /// A missing file is a fatal configuration error that points the user
    /// at the `init` workflow.
    pub fn load(path: &Path) -> Result<Self, crate::Error> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                crate::Error::config(format!(
                    "Configuration file {} not found. Run `typesync init` to create it.",
                    path.display()
                ))
            } else {
                crate::Error::config(format!(
                    "Error reading configuration file {}: {}",
                    path.display(),
                    err
                ))
            }
        })?;

        let config: Self = serde_json::from_str(&raw)
            .map_err(|err| crate::Error::config(format!("Invalid configuration: {err}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.port == 0 {
            return Err(crate::Error::config("PORT must be a positive integer"));
        }

        if !self.spec_url.starts_with("http://") && !self.spec_url.starts_with("https://") {
            return Err(crate::Error::config(format!(
                "OPENAPI_SPEC_URL must be an absolute http or https URL. Got: {}",
                self.spec_url
            )));
        }

        if !TYPE_DEFINITION_EXTENSIONS
            .iter()
            .any(|ext| self.output_path.ends_with(ext))
        {
            return Err(crate::Error::config(format!(
                "OUTPUT_FILE_PATH must end in a type definitions extension ({}). Got: {}",
                TYPE_DEFINITION_EXTENSIONS.join(", "),
                self.output_path
            )));
        }

        if let Some(interval) = self.update_interval_ms
            && interval == 0
        {
            return Err(crate::Error::config(
                "UPDATE_INTERVAL must be greater than zero milliseconds",
            ));
        }

        if let Some(ref dir) = self.watch_dir
            && dir.is_empty()
        {
            return Err(crate::Error::config("WATCH_DIR cannot be empty"));
        }

        Ok(())
    }

    /// Compute which trigger source is active for this configuration
    ///
    /// Exactly one mode is active: `UPDATE_INTERVAL` selects the periodic
    /// trigger and takes precedence; otherwise the watch trigger observes
    /// `WATCH_DIR` (defaulting to the working directory).
    pub fn trigger_mode(&self) -> TriggerMode {
        match self.update_interval_ms {
            Some(interval) => TriggerMode::Interval(Duration::from_millis(interval)),
            None => TriggerMode::Watch(PathBuf::from(
                self.watch_dir.as_deref().unwrap_or("."),
            )),
        }
    }
}

/// The active trigger mode derived from the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerMode {
    /// Periodic regeneration at a fixed interval
    Interval(Duration),
    /// Regeneration on filesystem changes under the given directory
    Watch(PathBuf),
}

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    /// Lowercase name as it appears in the configuration file
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log verbosity level
///
/// The ladder follows the original tooling's winston levels; levels finer
/// than `info` are folded onto the nearest `tracing` level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Http,
    Verbose,
    Debug,
    Silly,
}

impl LogLevel {
    /// Map onto the corresponding `tracing` level
    pub fn as_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info | LogLevel::Http => tracing::Level::INFO,
            LogLevel::Verbose | LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Silly => tracing::Level::TRACE,
        }
    }
}
