//! Flat-file export of batches.
//!
//! JSON exports hold the batch flat mapping (`records`, `batch_id`,
//! `processed_at`). Reading one back re-validates every record, so an
//! export cannot smuggle in data that would fail the measurement rules.

use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::batch::Batch;
use crate::error::{ExportError, ExportResult};
use crate::models::FlatBatch;
use crate::validation::RecordValidator;

/// Write a batch as pretty JSON, creating parent directories.
pub fn write_batch_json(batch: &Batch, path: &Path) -> ExportResult<()> {
    ensure_parent(path)?;
    let content = serde_json::to_string_pretty(batch)?;
    fs::write(path, content)?;
    Ok(())
}

/// Read a JSON export back into a batch.
pub fn read_batch_json(path: &Path, validator: &RecordValidator) -> ExportResult<Batch> {
    let content = fs::read_to_string(path)?;
    let flat: FlatBatch = serde_json::from_str(&content)?;
    batch_from_flat(flat, validator)
}

/// Rebuild a batch from its flat mapping, re-validating each record.
pub fn batch_from_flat(flat: FlatBatch, validator: &RecordValidator) -> ExportResult<Batch> {
    let records = flat
        .records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            if record.region.trim().is_empty() {
                return Err(ExportError::MissingRegion { index });
            }
            validator
                .validate_flat(record)
                .map_err(|error| ExportError::InvalidRecord { index, error })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Batch::restore(records, flat.batch_id, flat.processed_at)?)
}

/// Write the batch records as CSV: `timestamp,load_mw,region`, then every
/// extra field seen in the batch (sorted by name).
pub fn write_records_csv(batch: &Batch, path: &Path) -> ExportResult<()> {
    ensure_parent(path)?;

    let extra_columns: BTreeSet<&str> = batch
        .records()
        .iter()
        .flat_map(|r| r.extra().keys().map(String::as_str))
        .collect();

    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["timestamp", "load_mw", "region"];
    header.extend(extra_columns.iter().copied());
    writer.write_record(&header)?;

    for record in batch.records() {
        let mut row = vec![
            record.timestamp().to_rfc3339(),
            record.load_mw().to_string(),
            record.region().to_string(),
        ];
        row.extend(
            extra_columns
                .iter()
                .map(|col| record.extra().get(*col).map(cell_text).unwrap_or_default()),
        );
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn ensure_parent(path: &Path) -> ExportResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::ValidationError;
    use crate::ingest;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use serde_json::{json, Map};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
    }

    fn validator() -> RecordValidator {
        RecordValidator::new(Arc::new(ManualClock::new(now())))
    }

    fn sample_batch() -> Batch {
        let v = validator();
        let mut extra = Map::new();
        extra.insert("resolution".into(), json!("PT60M"));
        let records = vec![
            v.validate(now() - Duration::hours(2), 100.0, "DE", extra).unwrap(),
            v.validate(now() - Duration::hours(1), 250.5, "DE", Map::new()).unwrap(),
        ];
        Batch::new(records, "batch_20250501_120000").unwrap()
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("batch.json");

        let mut batch = sample_batch();
        batch.mark_processed(&ManualClock::new(now()));
        write_batch_json(&batch, &path).unwrap();

        let back = read_batch_json(&path, &validator()).unwrap();
        assert_eq!(back, batch);
        assert_eq!(back.records()[0].extra()["resolution"], "PT60M");
        assert_eq!(back.processed_at(), Some(now()));
    }

    #[test]
    fn test_json_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("batch.json");
        write_batch_json(&sample_batch(), &path).unwrap();

        let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let keys: BTreeSet<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, BTreeSet::from(["batch_id", "processed_at", "records"]));
    }

    #[test]
    fn test_import_revalidates_records() {
        let flat: FlatBatch = serde_json::from_value(json!({
            "records": [
                { "timestamp": "2025-05-01T10:00:00Z", "load_mw": 10.0, "region": "DE" },
                { "timestamp": "2025-05-01T11:00:00Z", "load_mw": 0.0, "region": "DE" }
            ],
            "batch_id": "b",
            "processed_at": null
        }))
        .unwrap();

        match batch_from_flat(flat, &validator()).unwrap_err() {
            ExportError::InvalidRecord { index, error } => {
                assert_eq!(index, 1);
                assert_eq!(error, ValidationError::InvalidLoadValue { load_mw: 0.0 });
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_import_rejects_empty_region() {
        let flat: FlatBatch = serde_json::from_value(json!({
            "records": [
                { "timestamp": "2025-05-01T10:00:00Z", "load_mw": 10.0, "region": "DE" },
                { "timestamp": "2025-05-01T11:00:00Z", "load_mw": 12.0, "region": "  " }
            ],
            "batch_id": "b",
            "processed_at": null
        }))
        .unwrap();

        assert!(matches!(
            batch_from_flat(flat, &validator()),
            Err(ExportError::MissingRegion { index: 1 })
        ));
    }

    #[test]
    fn test_import_rejects_empty_batch_id() {
        let flat = FlatBatch {
            records: vec![],
            batch_id: "".into(),
            processed_at: None,
        };
        assert!(matches!(
            batch_from_flat(flat, &validator()),
            Err(ExportError::Batch(_))
        ));
    }

    #[test]
    fn test_csv_export_reingests() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.csv");
        let batch = sample_batch();
        write_records_csv(&batch, &path).unwrap();

        let parsed = ingest::parse_file(&path, None).unwrap();
        assert_eq!(parsed.headers, vec!["timestamp", "load_mw", "region", "resolution"]);
        assert_eq!(parsed.rows.len(), 2);

        let typed = parsed.rows[1].parse().unwrap();
        assert_eq!(typed.timestamp, batch.records()[1].timestamp());
        assert_eq!(typed.load_mw, 250.5);
        assert_eq!(parsed.rows[0].extra["resolution"], "PT60M");
        assert_eq!(parsed.rows[1].extra["resolution"], "");
    }
}
