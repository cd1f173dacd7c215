//! Error types for the load validation pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`ValidationError`] - Record rule violations (positivity, future timestamps)
//! - [`RowError`] - Raw rows the row source could not turn into typed values
//! - [`RecordError`] - Either of the above, for a single rejected row
//! - [`BatchError`] - Batch construction errors
//! - [`CsvError`] - CSV reading errors
//! - [`ExportError`] - Flat-file export and re-import errors
//! - [`ConfigError`] - Environment configuration errors
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use chrono::{DateTime, Utc};
use thiserror::Error;

// =============================================================================
// Record Validation Errors
// =============================================================================

/// A load record violated one of the measurement rules.
///
/// Only the first failing rule is reported. Rules are checked in a fixed
/// order: load positivity, then the temporal bound.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// `load_mw` was zero or negative.
    #[error("load_mw must be positive (got {load_mw})")]
    InvalidLoadValue { load_mw: f64 },

    /// `timestamp` lies after the clock's current time.
    #[error("timestamp cannot be in the future (current time: {current_time}, got: {timestamp})")]
    FutureTimestamp {
        current_time: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidLoadValue { .. } => "load_mw",
            Self::FutureTimestamp { .. } => "timestamp",
        }
    }

    /// The rule that was violated.
    pub fn rule(&self) -> &'static str {
        match self {
            Self::InvalidLoadValue { .. } => "load_mw > 0",
            Self::FutureTimestamp { .. } => "timestamp <= now",
        }
    }

    /// The rejected value, rendered as text.
    pub fn rejected_value(&self) -> String {
        match self {
            Self::InvalidLoadValue { load_mw } => load_mw.to_string(),
            Self::FutureTimestamp { timestamp, .. } => timestamp.to_rfc3339(),
        }
    }
}

// =============================================================================
// Row Errors (row source collaborator)
// =============================================================================

/// A raw row could not be turned into typed inputs for the validator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    /// A required column is present in the header but empty in this row.
    #[error("missing value for required field '{field}'")]
    MissingField { field: String },

    /// The row itself could not be read.
    #[error("unreadable row: {reason}")]
    Unreadable { reason: String },

    /// A value could not be converted to the field's type.
    #[error("cannot parse {field} from '{value}': {reason}")]
    Unparseable {
        field: String,
        value: String,
        reason: String,
    },
}

impl RowError {
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field } | Self::Unparseable { field, .. } => field,
            Self::Unreadable { .. } => "row",
        }
    }
}

/// Why a single input row was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error(transparent)]
    Malformed(#[from] RowError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl RecordError {
    pub fn field(&self) -> &str {
        match self {
            Self::Malformed(e) => e.field(),
            Self::Invalid(e) => e.field(),
        }
    }
}

/// A rejected input row with its 1-based line number in the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub line: usize,
    pub error: RecordError,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Line {}: {}", self.line, self.error)
    }
}

// =============================================================================
// Batch Errors
// =============================================================================

/// Errors during batch construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// Empty or whitespace-only batch identifier.
    #[error("batch_id must not be empty")]
    InvalidBatchIdentifier,
}

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading the CSV row source.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode the file content.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Invalid CSV format.
    #[error("Invalid CSV format: {0}")]
    Parse(#[from] csv::Error),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// Delimiter cannot be used by the CSV reader.
    #[error("Delimiter must be a single ASCII character, got '{0}'")]
    InvalidDelimiter(char),

    /// Required columns absent from the header.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while writing or re-importing flat files.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Export CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Exported batch is invalid: {0}")]
    Batch(#[from] BatchError),

    /// A re-imported record no longer passes validation.
    #[error("Record {index} failed validation: {error}")]
    InvalidRecord {
        index: usize,
        error: ValidationError,
    },

    /// A re-imported record has an empty `region`.
    #[error("Record {index} has an empty region")]
    MissingRegion { index: usize },
}

// =============================================================================
// Configuration Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

// =============================================================================
// Logging Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum LoggingError {
    /// The process-wide subscriber was already installed.
    #[error("logging is already initialized")]
    AlreadyInitialized,

    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Cannot open log file: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::pipeline::Pipeline`].
/// It wraps all lower-level errors and adds pipeline-specific variants.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// CSV reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Batch construction error.
    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// No valid records remained after validation.
    #[error("No valid records found ({rejected} of {rows_read} rows rejected)")]
    EmptyBatch { rows_read: usize, rejected: usize },

    /// A concurrent worker did not complete.
    #[error("Worker failed: {0}")]
    Worker(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
