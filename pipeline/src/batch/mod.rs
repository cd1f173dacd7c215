//! Batch aggregation of validated load records.
//!
//! A [`Batch`] owns an ordered set of [`LoadRecord`]s under one identifier
//! and tracks whether it has been processed:
//!
//! ```text
//!             mark_processed            mark_processed
//! ┌─────────┐ ───────────────▶ ┌───────────┐ ──┐ (refreshes processed_at)
//! │ PENDING │                  │ PROCESSED │ ◀─┘
//! └─────────┘                  └───────────┘
//! ```
//!
//! Membership is fixed at creation. Only `processed_at` changes afterwards.

use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::clock::Clock;
use crate::error::BatchError;
use crate::models::{FlatBatch, LoadRecord};

// =============================================================================
// Batch State
// =============================================================================

/// Processing state derived from `processed_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BatchState {
    Pending,
    Processed,
}

// =============================================================================
// Statistics
// =============================================================================

/// Aggregate load statistics for a batch.
///
/// Values are unrounded; an empty batch reports zeros.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatchStatistics {
    pub count: usize,
    pub avg_load: f64,
    pub min_load: f64,
    pub max_load: f64,
}

impl BatchStatistics {
    pub const EMPTY: Self = Self {
        count: 0,
        avg_load: 0.0,
        min_load: 0.0,
        max_load: 0.0,
    };
}

impl fmt::Display for BatchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "count={}, avg_load={:.2} MW, min_load={:.2} MW, max_load={:.2} MW",
            self.count, self.avg_load, self.min_load, self.max_load
        )
    }
}

// =============================================================================
// Batch
// =============================================================================

/// A collection of validated records plus processing metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "FlatBatch")]
pub struct Batch {
    batch_id: String,
    records: Vec<LoadRecord>,
    processed_at: Option<DateTime<Utc>>,
}

impl Batch {
    /// Create a pending batch. Records may be empty; no deduplication is done.
    pub fn new(records: Vec<LoadRecord>, batch_id: impl Into<String>) -> Result<Self, BatchError> {
        let batch_id = batch_id.into();
        if batch_id.trim().is_empty() {
            return Err(BatchError::InvalidBatchIdentifier);
        }

        Ok(Self {
            batch_id,
            records,
            processed_at: None,
        })
    }

    /// Create a batch whose id is derived from the clock:
    /// `batch_YYYYMMDD_HHMMSS`.
    pub fn with_generated_id(records: Vec<LoadRecord>, clock: &dyn Clock) -> Self {
        Self {
            batch_id: generate_batch_id(clock.now()),
            records,
            processed_at: None,
        }
    }

    /// Rebuild a batch from exported parts, keeping its processing time.
    pub(crate) fn restore(
        records: Vec<LoadRecord>,
        batch_id: String,
        processed_at: Option<DateTime<Utc>>,
    ) -> Result<Self, BatchError> {
        let mut batch = Self::new(records, batch_id)?;
        batch.processed_at = processed_at;
        Ok(batch)
    }

    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    /// Records in input order.
    pub fn records(&self) -> &[LoadRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn processed_at(&self) -> Option<DateTime<Utc>> {
        self.processed_at
    }

    pub fn state(&self) -> BatchState {
        match self.processed_at {
            Some(_) => BatchState::Processed,
            None => BatchState::Pending,
        }
    }

    /// Count, mean, minimum and maximum of `load_mw`.
    pub fn statistics(&self) -> BatchStatistics {
        if self.records.is_empty() {
            return BatchStatistics::EMPTY;
        }

        let (sum, min, max) = self.records.iter().map(LoadRecord::load_mw).fold(
            (0.0, f64::INFINITY, f64::NEG_INFINITY),
            |(sum, min, max), load| (sum + load, min.min(load), max.max(load)),
        );
        let count = self.records.len();

        BatchStatistics {
            count,
            avg_load: sum / count as f64,
            min_load: min,
            max_load: max,
        }
    }

    /// Set `processed_at` to the clock's current time.
    ///
    /// Calling this on a processed batch refreshes the timestamp. Returns
    /// the time that was set.
    pub fn mark_processed(&mut self, clock: &dyn Clock) -> DateTime<Utc> {
        let now = clock.now();
        self.processed_at = Some(now);
        now
    }

    /// Mean load per hour of day (0-23), for hours that have records.
    pub fn hourly_averages(&self) -> BTreeMap<u32, f64> {
        let mut buckets: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
        for record in &self.records {
            let entry = buckets.entry(record.timestamp().hour()).or_insert((0.0, 0));
            entry.0 += record.load_mw();
            entry.1 += 1;
        }

        buckets
            .into_iter()
            .map(|(hour, (sum, n))| (hour, sum / n as f64))
            .collect()
    }

    /// Earliest and latest measurement time.
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = self.records.first()?.timestamp();
        Some(self.records.iter().fold((first, first), |(lo, hi), r| {
            (lo.min(r.timestamp()), hi.max(r.timestamp()))
        }))
    }

    /// Distinct region identifiers, sorted.
    pub fn regions(&self) -> BTreeSet<&str> {
        self.records.iter().map(LoadRecord::region).collect()
    }

    /// Flat key/value view used for export.
    pub fn to_flat_mapping(&self) -> FlatBatch {
        FlatBatch::from(self.clone())
    }
}

impl From<Batch> for FlatBatch {
    fn from(batch: Batch) -> Self {
        Self {
            records: batch.records.into_iter().map(Into::into).collect(),
            batch_id: batch.batch_id,
            processed_at: batch.processed_at,
        }
    }
}

/// `batch_YYYYMMDD_HHMMSS` for the given instant.
pub fn generate_batch_id(at: DateTime<Utc>) -> String {
    format!("batch_{}", at.format("%Y%m%d_%H%M%S"))
}

// =============================================================================
// Tests
// =============================================================================
