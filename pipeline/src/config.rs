//! Application configuration.
//!
//! Values come from the environment (a `.env` file is loaded first if
//! present). Command-line flags override them in the binary.
//!
//! | Variable                     | Default |
//! |------------------------------|---------|
//! | `ENTSOE_LOG_LEVEL`           | `info`  |
//! | `ENTSOE_LOG_DIR`             | `logs`  |
//! | `ENTSOE_LOG_FILE`            | `true`  |
//! | `ENTSOE_EXPORT_DIR`          | `data`  |
//! | `ENTSOE_MAX_REPORTED_ERRORS` | `10`    |

use std::env;
use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_EXPORT_DIR: &str = "data";
pub const DEFAULT_MAX_REPORTED_ERRORS: usize = 10;

/// Default file name for the validated batch export.
pub const DEFAULT_EXPORT_FILE: &str = "validated_load_data.json";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Minimum level: trace, debug, info, warn or error.
    pub level: String,
    /// Directory holding `pipeline.log`.
    pub dir: PathBuf,
    /// Whether to write the log file at all.
    pub to_file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            dir: PathBuf::from(DEFAULT_LOG_DIR),
            to_file: true,
        }
    }
}

/// Pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub log: LogConfig,
    /// Where exports go when no explicit path is given.
    pub export_dir: PathBuf,
    /// How many rejected rows the CLI echoes in its summary.
    pub max_reported_errors: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            max_reported_errors: DEFAULT_MAX_REPORTED_ERRORS,
        }
    }
}

impl PipelineConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Try loading .env file
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(level) = lookup("ENTSOE_LOG_LEVEL") {
            config.log.level = parse_level(&level)?;
        }
        if let Some(dir) = lookup("ENTSOE_LOG_DIR") {
            config.log.dir = PathBuf::from(dir);
        }
        if let Some(flag) = lookup("ENTSOE_LOG_FILE") {
            config.log.to_file = parse_bool("ENTSOE_LOG_FILE", &flag)?;
        }
        if let Some(dir) = lookup("ENTSOE_EXPORT_DIR") {
            config.export_dir = PathBuf::from(dir);
        }
        if let Some(max) = lookup("ENTSOE_MAX_REPORTED_ERRORS") {
            config.max_reported_errors = max.trim().parse().map_err(|_| invalid("ENTSOE_MAX_REPORTED_ERRORS", &max))?;
        }

        Ok(config)
    }
}

/// Normalize and check a log level name.
pub fn parse_level(value: &str) -> Result<String, ConfigError> {
    let level = value.trim().to_lowercase();
    if LOG_LEVELS.contains(&level.as_str()) {
        Ok(level)
    } else {
        Err(invalid("ENTSOE_LOG_LEVEL", value))
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
