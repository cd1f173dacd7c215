//! # entsoe-pipeline - ENTSO-E electricity load validation and batching
//!
//! Reads hourly load measurements exported from the ENTSO-E transparency
//! platform, rejects physically impossible or future readings, groups the
//! survivors into batches and reports summary statistics.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Ingest    │────▶│  Validator  │────▶│    Batch    │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │  (2 rules)  │     │ (stats/JSON)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use entsoe_pipeline::{Logger, Pipeline, RunOptions};
//! use std::path::Path;
//!
//! let pipeline = Pipeline::system(Logger::new());
//! let report = pipeline.run(Path::new("entsoe_load.csv"), &RunOptions::default()).unwrap();
//! println!("{}", report.processing.statistics);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`models`] - Load records and their flat mappings
//! - [`validation`] - Record validator
//! - [`batch`] - Batch aggregation and statistics
//! - [`ingest`] - CSV parsing with auto-detection
//! - [`export`] - JSON/CSV export and re-import
//! - [`pipeline`] - End-to-end orchestration
//! - [`clock`], [`config`], [`logging`] - Ambient services

// Core modules
pub mod error;
pub mod models;

// Time
pub mod clock;

// Validation
pub mod validation;

// Aggregation
pub mod batch;

// Parsing
pub mod ingest;

// Export
pub mod export;

// Orchestration
pub mod pipeline;

// Ambient
pub mod config;
pub mod logging;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    BatchError,
    ConfigError,
    CsvError,
    ExportError,
    LoggingError,
    PipelineError,
    PipelineResult,
    RecordError,
    Rejection,
    RowError,
    ValidationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{FlatBatch, FlatRecord, LoadRecord};
pub use batch::{Batch, BatchState, BatchStatistics};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use clock::{Clock, ManualClock, SystemClock};
pub use validation::RecordValidator;

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use ingest::{
    detect_delimiter,
    detect_encoding,
    decode_content,
    parse_bytes,
    parse_file,
    ParsedCsv,
    RawRow,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use export::{read_batch_json, write_batch_json, write_records_csv};
pub use pipeline::{
    CsvInfo,
    LoadOptions,
    LoadOutcome,
    Pipeline,
    ProcessReport,
    RunOptions,
    RunReport,
    ValidationSummary,
};

// =============================================================================
// Re-exports - Config & Logging
// =============================================================================

pub use config::{LogConfig, PipelineConfig};
pub use logging::{LogEntry, LogLevel, Logger};
