//! Pipeline logging.
//!
//! Two pieces:
//!
//! - [`init`] installs the process-wide `tracing` subscriber (stderr, plus
//!   an optional `pipeline.log` file). The binary calls it once at startup.
//! - [`Logger`] is the handle the pipeline reports through. It is passed in
//!   explicitly, forwards every entry to `tracing`, and broadcasts it to any
//!   [`subscribe`](Logger::subscribe)d receiver.

use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogConfig;
use crate::error::LoggingError;

/// File written inside the configured log directory.
pub const LOG_FILE_NAME: &str = "pipeline.log";

/// Entries buffered per subscriber before old ones are dropped.
const CHANNEL_CAPACITY: usize = 100;

/// Log level of a pipeline entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth, for grouped output such as hourly averages.
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }
}

/// Cloneable logging handle. Clones share one broadcast channel.
#[derive(Debug, Clone)]
pub struct Logger {
    sender: broadcast::Sender<LogEntry>,
}

impl Logger {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Emit an entry to `tracing` and to all subscribers.
    pub fn log(&self, entry: LogEntry) {
        let indent = "  ".repeat(entry.indent as usize);
        match entry.level {
            LogLevel::Info => tracing::info!("{}{}", indent, entry.message),
            LogLevel::Success => tracing::info!("{}✓ {}", indent, entry.message),
            LogLevel::Warning => tracing::warn!("{}{}", indent, entry.message),
            LogLevel::Error => tracing::error!("{}{}", indent, entry.message),
        }

        // No receivers is fine.
        let _ = self.sender.send(entry);
    }

    /// Receive every entry logged after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }

    pub fn info(&self, msg: impl Into<String>) {
        self.log(LogEntry::info(msg));
    }

    pub fn success(&self, msg: impl Into<String>) {
        self.log(LogEntry::success(msg));
    }

    pub fn warning(&self, msg: impl Into<String>) {
        self.log(LogEntry::warning(msg));
    }

    pub fn error(&self, msg: impl Into<String>) {
        self.log(LogEntry::error(msg));
    }

    pub fn info_indent(&self, msg: impl Into<String>, indent: u8) {
        self.log(LogEntry::info(msg).with_indent(indent));
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Install the process-wide subscriber.
///
/// Fails with [`LoggingError::AlreadyInitialized`] on a second call.
pub fn init(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| LoggingError::InvalidFilter(e.to_string()))?;

    let file_layer = if config.to_file {
        fs::create_dir_all(&config.dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(config.dir.join(LOG_FILE_NAME))?;
        Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)
}
