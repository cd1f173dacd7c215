//! Record validation for electricity load measurements.
//!
//! One deterministic routine checks every measurement:
//!
//! 1. `load_mw > 0` - zero or negative load is physically invalid
//! 2. `timestamp <= now` - no future-dated measurements
//!
//! The first failing rule wins, so each rejected record reports exactly
//! one [`ValidationError`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use entsoe_pipeline::{RecordValidator, SystemClock};
//!
//! let validator = RecordValidator::new(Arc::new(SystemClock));
//! let record = validator.validate(timestamp, 45000.5, "DE", Default::default())?;
//! ```

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::clock::Clock;
use crate::error::ValidationError;
use crate::models::{FlatRecord, LoadRecord};

/// Validates raw measurements into [`LoadRecord`]s.
#[derive(Clone)]
pub struct RecordValidator {
    clock: Arc<dyn Clock>,
}

impl RecordValidator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// The clock consulted for the temporal rule.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Validate one measurement.
    ///
    /// `extra` is stored as-is on the record. No side effects apart from
    /// reading the clock.
    pub fn validate(
        &self,
        timestamp: DateTime<Utc>,
        load_mw: f64,
        region: impl Into<String>,
        extra: Map<String, Value>,
    ) -> Result<LoadRecord, ValidationError> {
        if load_mw.is_nan() || load_mw <= 0.0 {
            return Err(ValidationError::InvalidLoadValue { load_mw });
        }

        let current_time = self.clock.now();
        if timestamp > current_time {
            return Err(ValidationError::FutureTimestamp {
                current_time,
                timestamp,
            });
        }

        Ok(LoadRecord::from_validated(
            timestamp,
            load_mw,
            region.into(),
            extra,
        ))
    }

    /// Re-validate a record read back from a flat export.
    pub fn validate_flat(&self, flat: FlatRecord) -> Result<LoadRecord, ValidationError> {
        self.validate(flat.timestamp, flat.load_mw, flat.region, flat.extra)
    }
}

impl std::fmt::Debug for RecordValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordValidator").finish_non_exhaustive()
    }
}
