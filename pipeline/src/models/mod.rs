//! Domain models for the load validation pipeline.
//!
//! - [`LoadRecord`] - A single validated load measurement
//! - [`FlatRecord`] - Flat serialization view of a record
//! - [`FlatBatch`] - Flat serialization view of a batch
//!
//! A [`LoadRecord`] can only be obtained from the
//! [`RecordValidator`](crate::validation::RecordValidator), so holding one
//! means both measurement rules held at validation time. The flat views are
//! the export format: they deserialize freely and must be re-validated to
//! become records again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names owned by the record itself. Extra fields never use them.
pub const CORE_FIELDS: [&str; 3] = ["timestamp", "load_mw", "region"];

// =============================================================================
// Load Record
// =============================================================================

/// A single electricity load measurement.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "FlatRecord")]
pub struct LoadRecord {
    timestamp: DateTime<Utc>,
    load_mw: f64,
    region: String,
    extra: Map<String, Value>,
}

impl LoadRecord {
    /// Build a record whose rules were already checked by the validator.
    pub(crate) fn from_validated(
        timestamp: DateTime<Utc>,
        load_mw: f64,
        region: String,
        mut extra: Map<String, Value>,
    ) -> Self {
        extra.retain(|key, _| !CORE_FIELDS.contains(&key.as_str()));
        Self {
            timestamp,
            load_mw,
            region,
            extra,
        }
    }

    /// When the load was measured.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Load in megawatts, always > 0.
    pub fn load_mw(&self) -> f64 {
        self.load_mw
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Additional fields carried through unvalidated.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Flat key/value view used for export.
    pub fn to_flat_mapping(&self) -> FlatRecord {
        FlatRecord::from(self.clone())
    }
}

// =============================================================================
// Flat Views
// =============================================================================

/// Export shape of a record: `timestamp`, `load_mw`, `region`, followed by
/// any extra fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub timestamp: DateTime<Utc>,
    pub load_mw: f64,
    pub region: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<LoadRecord> for FlatRecord {
    fn from(record: LoadRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            load_mw: record.load_mw,
            region: record.region,
            extra: record.extra,
        }
    }
}

/// Export shape of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatBatch {
    pub records: Vec<FlatRecord>,
    pub batch_id: String,
    pub processed_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample() -> LoadRecord {
        let mut extra = Map::new();
        extra.insert("source".into(), json!("entsoe"));
        LoadRecord::from_validated(
            Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap(),
            45000.5,
            "DE".into(),
            extra,
        )
    }

    #[test]
    fn test_flat_mapping_fields() {
        let value = serde_json::to_value(sample()).unwrap();
        let obj = value.as_object().unwrap();

        assert_eq!(obj["timestamp"], "2025-05-01T12:00:00Z");
        assert_eq!(obj["load_mw"], 45000.5);
        assert_eq!(obj["region"], "DE");
        assert_eq!(obj["source"], "entsoe");
        assert_eq!(obj.len(), 4);
    }

    #[test]
    fn test_extra_cannot_shadow_core_fields() {
        let mut extra = Map::new();
        extra.insert("region".into(), json!("FR"));
        extra.insert("quality".into(), json!("A"));
        let record = LoadRecord::from_validated(
            Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap(),
            100.0,
            "DE".into(),
            extra,
        );

        assert_eq!(record.region(), "DE");
        assert_eq!(record.extra().len(), 1);
        assert!(record.extra().contains_key("quality"));
    }

    #[test]
    fn test_flat_record_roundtrip_keeps_extra() {
        let flat = sample().to_flat_mapping();
        let text = serde_json::to_string(&flat).unwrap();
        let back: FlatRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(back, flat);
        assert_eq!(back.extra["source"], "entsoe");
    }

    #[test]
    fn test_non_string_extras_roundtrip() {
        let mut extra = Map::new();
        extra.insert("quality".into(), json!(3));
        extra.insert("share".into(), json!(0.25));
        extra.insert("estimated".into(), json!(false));
        extra.insert("source".into(), json!({ "area": "10Y1001A1001A83F", "codes": [1, 2] }));
        extra.insert("note".into(), Value::Null);
        let record = LoadRecord::from_validated(
            Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap(),
            100.0,
            "DE".into(),
            extra.clone(),
        );

        let text = serde_json::to_string(&record).unwrap();
        let back: FlatRecord = serde_json::from_str(&text).unwrap();

        assert_eq!(back.extra, extra);
        assert_eq!(back.extra["source"]["codes"][1], 2);
        assert_eq!(back, record.to_flat_mapping());
    }
}
