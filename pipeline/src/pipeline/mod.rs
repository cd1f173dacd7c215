//! High-level pipeline API: load, validate, batch, process, export.
//!
//! # Example
//!
//! ```rust,ignore
//! use entsoe_pipeline::{Logger, Pipeline, RunOptions};
//! use std::path::Path;
//!
//! let pipeline = Pipeline::system(Logger::new());
//! let report = pipeline.run(Path::new("data/entsoe_load.csv"), &RunOptions::default())?;
//! println!("Average load: {:.2} MW", report.processing.statistics.avg_load);
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::batch::{generate_batch_id, Batch, BatchStatistics};
use crate::clock::{Clock, SystemClock};
use crate::error::{PipelineError, PipelineResult, RecordError, Rejection};
use crate::export;
use crate::ingest::{self, ParsedCsv, RawRow};
use crate::logging::Logger;
use crate::models::LoadRecord;
use crate::validation::RecordValidator;

// =============================================================================
// Options
// =============================================================================

/// Options for loading a file into a batch
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit batch id; generated from the clock when absent.
    pub batch_id: Option<String>,

    /// CSV delimiter; auto-detected when absent.
    pub delimiter: Option<char>,
}

/// Options for a full run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub load: LoadOptions,

    /// Write the processed batch as JSON here.
    pub export: Option<PathBuf>,
}

// =============================================================================
// Results
// =============================================================================

/// CSV file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
    /// Empty cells per column, in header order.
    pub empty_cells: Vec<(String, usize)>,
}

impl CsvInfo {
    fn from_parsed(parsed: &ParsedCsv) -> Self {
        Self {
            encoding: parsed.encoding.clone(),
            delimiter: parsed.delimiter,
            headers: parsed.headers.clone(),
            row_count: parsed.rows_read(),
            empty_cells: parsed.empty_cells(),
        }
    }
}

/// A freshly loaded, still pending batch plus everything that was rejected.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub batch: Batch,
    /// Rejected rows, ordered by line.
    pub rejections: Vec<Rejection>,
    pub csv_info: CsvInfo,
}

/// Row-level validation results without building a batch.
#[derive(Debug, Clone)]
pub struct ValidationSummary {
    pub csv_info: CsvInfo,
    pub valid: usize,
    pub rejections: Vec<Rejection>,
}

/// What processing a batch produced.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    pub batch_id: String,
    pub statistics: BatchStatistics,
    /// Mean load per hour of day.
    pub hourly_averages: BTreeMap<u32, f64>,
    pub processed_at: DateTime<Utc>,
}

/// Result of a complete run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub batch: Batch,
    pub rejections: Vec<Rejection>,
    pub csv_info: CsvInfo,
    pub processing: ProcessReport,
    pub export_path: Option<PathBuf>,
}

// =============================================================================
// Pipeline
// =============================================================================

/// Validates load files into batches and processes them.
///
/// Cheap to clone; clones share the clock and the logger channel.
#[derive(Debug, Clone)]
pub struct Pipeline {
    validator: RecordValidator,
    logger: Logger,
}

impl Pipeline {
    pub fn new(clock: Arc<dyn Clock>, logger: Logger) -> Self {
        Self {
            validator: RecordValidator::new(clock),
            logger,
        }
    }

    /// A pipeline on wall-clock time.
    pub fn system(logger: Logger) -> Self {
        Self::new(Arc::new(SystemClock), logger)
    }

    pub fn validator(&self) -> &RecordValidator {
        &self.validator
    }

    pub fn clock(&self) -> &dyn Clock {
        self.validator.clock().as_ref()
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Parse and validate each row. Failures never stop the remaining rows.
    pub fn validate_rows(&self, rows: &[RawRow]) -> (Vec<LoadRecord>, Vec<Rejection>) {
        let mut records = Vec::with_capacity(rows.len());
        let mut rejections = Vec::new();

        for row in rows {
            let result = row.parse().map_err(RecordError::from).and_then(|typed| {
                self.validator
                    .validate(typed.timestamp, typed.load_mw, typed.region, typed.extra)
                    .map_err(RecordError::from)
            });

            match result {
                Ok(record) => records.push(record),
                Err(error) => rejections.push(Rejection {
                    line: row.line,
                    error,
                }),
            }
        }

        (records, rejections)
    }

    /// Validate every row of a file and report, without building a batch.
    pub fn validate_file(&self, path: &Path, delimiter: Option<char>) -> PipelineResult<ValidationSummary> {
        let parsed = self.read(path, delimiter)?;
        let (records, rejections) = self.check_rows(&parsed);

        Ok(ValidationSummary {
            csv_info: CsvInfo::from_parsed(&parsed),
            valid: records.len(),
            rejections,
        })
    }

    /// Load and validate a file into a pending batch.
    pub fn load_file(&self, path: &Path, options: &LoadOptions) -> PipelineResult<LoadOutcome> {
        let parsed = self.read(path, options.delimiter)?;
        self.load_parsed(parsed, options)
    }

    /// Same as [`load_file`](Self::load_file) for in-memory CSV bytes.
    pub fn load_bytes(&self, bytes: &[u8], options: &LoadOptions) -> PipelineResult<LoadOutcome> {
        let parsed = ingest::parse_bytes(bytes, options.delimiter)?;
        self.load_parsed(parsed, options)
    }

    fn read(&self, path: &Path, delimiter: Option<char>) -> PipelineResult<ParsedCsv> {
        if !path.exists() {
            self.logger.error(format!("File not found: {}", path.display()));
            return Err(PipelineError::FileNotFound(path.display().to_string()));
        }

        self.logger.info(format!("Loading data from {}", path.display()));
        Ok(ingest::parse_file(path, delimiter)?)
    }

    /// Validate parsed rows, merge in unreadable ones, and log each rejection.
    fn check_rows(&self, parsed: &ParsedCsv) -> (Vec<LoadRecord>, Vec<Rejection>) {
        let (records, mut rejections) = self.validate_rows(&parsed.rows);
        rejections.extend(parsed.unreadable.iter().cloned());
        rejections.sort_by_key(|r| r.line);

        for rejection in &rejections {
            self.logger.warning(describe(rejection));
        }
        if !rejections.is_empty() {
            self.logger.warning(format!(
                "Found {} invalid records out of {}",
                rejections.len(),
                parsed.rows_read()
            ));
        }

        (records, rejections)
    }

    fn load_parsed(&self, parsed: ParsedCsv, options: &LoadOptions) -> PipelineResult<LoadOutcome> {
        let csv_info = CsvInfo::from_parsed(&parsed);
        self.logger.info(format!(
            "Read {} rows ({}, delimiter '{}')",
            csv_info.row_count,
            csv_info.encoding,
            format_delimiter(csv_info.delimiter)
        ));

        let (records, rejections) = self.check_rows(&parsed);

        if records.is_empty() {
            self.logger.error("No valid records found in the dataset");
            return Err(PipelineError::EmptyBatch {
                rows_read: csv_info.row_count,
                rejected: rejections.len(),
            });
        }

        let batch = match &options.batch_id {
            Some(id) => Batch::new(records, id.clone())?,
            None => Batch::with_generated_id(records, self.clock()),
        };
        self.logger.success(format!(
            "Successfully loaded {} valid records into batch {}",
            batch.len(),
            batch.batch_id()
        ));

        Ok(LoadOutcome {
            batch,
            rejections,
            csv_info,
        })
    }

    /// Compute statistics and hourly averages, then mark the batch processed.
    pub fn process(&self, batch: &mut Batch) -> ProcessReport {
        self.logger.info(format!(
            "Processing batch {} with {} records",
            batch.batch_id(),
            batch.len()
        ));

        let statistics = batch.statistics();
        self.logger.info(format!("Batch statistics: {}", statistics));

        let hourly_averages = batch.hourly_averages();
        self.logger.info("Hourly load averages:");
        for (hour, avg) in &hourly_averages {
            self.logger.info_indent(format!("Hour {}: {:.2} MW", hour, avg), 1);
        }

        let processed_at = batch.mark_processed(self.clock());
        self.logger.success(format!(
            "Successfully processed batch {} at {}",
            batch.batch_id(),
            processed_at
        ));

        ProcessReport {
            batch_id: batch.batch_id().to_string(),
            statistics,
            hourly_averages,
            processed_at,
        }
    }

    /// Load, process and optionally export one file.
    pub fn run(&self, path: &Path, options: &RunOptions) -> PipelineResult<RunReport> {
        self.logger.info("Starting data processing pipeline");

        let LoadOutcome {
            mut batch,
            rejections,
            csv_info,
        } = self.load_file(path, &options.load)?;

        let processing = self.process(&mut batch);

        if let Some(export_path) = &options.export {
            export::write_batch_json(&batch, export_path)?;
            self.logger.success(format!("Validated data saved to {}", export_path.display()));
        }

        self.logger.success("Pipeline completed successfully");

        Ok(RunReport {
            batch,
            rejections,
            csv_info,
            processing,
            export_path: options.export.clone(),
        })
    }

    /// Run several files concurrently, one blocking task per file.
    ///
    /// Each worker owns its batch. Batch ids are the generated id plus the
    /// 1-based input position and the file stem (`batch_..._2_load`), so
    /// they stay distinct even for equal stems. Results come back in input
    /// order; one file failing does not affect the others.
    pub async fn run_many(
        &self,
        paths: Vec<PathBuf>,
        delimiter: Option<char>,
    ) -> Vec<(PathBuf, PipelineResult<RunReport>)> {
        let base_id = generate_batch_id(self.clock().now());

        let handles: Vec<_> = paths
            .into_iter()
            .enumerate()
            .map(|(idx, path)| {
                let pipeline = self.clone();
                let options = RunOptions {
                    load: LoadOptions {
                        batch_id: Some(format!("{}_{}_{}", base_id, idx + 1, file_tag(&path))),
                        delimiter,
                    },
                    export: None,
                };
                let task_path = path.clone();
                let handle = tokio::task::spawn_blocking(move || pipeline.run(&task_path, &options));
                (path, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (path, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    self.logger.error(format!("Worker for {} failed: {}", path.display(), e));
                    Err(PipelineError::Worker(e.to_string()))
                }
            };
            results.push((path, result));
        }
        results
    }
}

/// One log line per rejection: line, field, rule and value.
fn describe(rejection: &Rejection) -> String {
    match &rejection.error {
        RecordError::Invalid(e) => format!(
            "Validation error in row {}: {} [field={}, rule={}, value={}]",
            rejection.line,
            e,
            e.field(),
            e.rule(),
            e.rejected_value()
        ),
        RecordError::Malformed(e) => format!(
            "Validation error in row {}: {} [field={}]",
            rejection.line,
            e,
            e.field()
        ),
    }
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

/// Filesystem-safe tag derived from a file name.
fn file_tag(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("input");
    stem.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchState;
    use crate::clock::ManualClock;
    use crate::error::{CsvError, RowError, ValidationError};
    use crate::logging::LogLevel;
    use chrono::{Duration, TimeZone};
    use std::fs;
    use tempfile::tempdir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
    }

    fn pipeline() -> (Pipeline, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(now()));
        (Pipeline::new(clock.clone(), Logger::new()), clock)
    }

    fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_scenario_a_valid_batch() {
        let (pipeline, _) = pipeline();
        let csv = "timestamp,load_mw,region\n\
                   2025-05-01 09:00:00,100.0,DE\n\
                   2025-05-01 10:00:00,200.0,DE\n\
                   2025-05-01 11:00:00,300.0,DE\n";

        let outcome = pipeline.load_bytes(csv.as_bytes(), &LoadOptions::default()).unwrap();
        assert!(outcome.rejections.is_empty());
        assert_eq!(outcome.batch.len(), 3);
        assert_eq!(outcome.batch.batch_id(), "batch_20250501_120000");
        assert_eq!(outcome.batch.state(), BatchState::Pending);

        let stats = outcome.batch.statistics();
        assert_eq!(stats.count, 3);
        assert!((stats.avg_load - 200.0).abs() < 1e-9);
        assert_eq!(stats.min_load, 100.0);
        assert_eq!(stats.max_load, 300.0);
    }

    #[test]
    fn test_scenario_b_negative_load_rejected() {
        let (pipeline, _) = pipeline();
        let csv = "timestamp,load_mw,region\n\
                   2025-05-01 09:00:00,-5.0,DE\n\
                   2025-05-01 10:00:00,200.0,DE\n";

        let outcome = pipeline.load_bytes(csv.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(outcome.batch.len(), 1);
        assert_eq!(outcome.rejections.len(), 1);

        let rejection = &outcome.rejections[0];
        assert_eq!(rejection.line, 2);
        assert_eq!(
            rejection.error,
            RecordError::Invalid(ValidationError::InvalidLoadValue { load_mw: -5.0 })
        );
        assert!(rejection.to_string().contains("-5"));
    }

    #[test]
    fn test_scenario_c_future_timestamp_rejected() {
        let (pipeline, _) = pipeline();
        let csv = "timestamp,load_mw,region\n\
                   2025-05-01 13:00:00,100.0,DE\n\
                   2025-05-01 11:00:00,100.0,DE\n";

        let outcome = pipeline.load_bytes(csv.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(outcome.rejections.len(), 1);
        assert_eq!(
            outcome.rejections[0].error,
            RecordError::Invalid(ValidationError::FutureTimestamp {
                current_time: now(),
                timestamp: now() + Duration::hours(1),
            })
        );
    }

    #[test]
    fn test_scenario_d_all_rows_rejected() {
        let (pipeline, _) = pipeline();
        let csv = "timestamp,load_mw,region\n\
                   2025-05-01 09:00:00,0,DE\n\
                   2025-05-02 09:00:00,10,DE\n\
                   not-a-date,10,DE\n";

        let err = pipeline.load_bytes(csv.as_bytes(), &LoadOptions::default()).unwrap_err();
        match err {
            PipelineError::EmptyBatch { rows_read, rejected } => {
                assert_eq!(rows_read, 3);
                assert_eq!(rejected, 3);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_header_only_file_is_empty_batch() {
        let (pipeline, _) = pipeline();
        let err = pipeline
            .load_bytes(b"timestamp,load_mw,region\n", &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyBatch { rows_read: 0, rejected: 0 }));
    }

    #[test]
    fn test_missing_columns_fail_whole_file() {
        let (pipeline, _) = pipeline();
        let err = pipeline
            .load_bytes(b"timestamp,load\n2025-05-01,1\n", &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Csv(CsvError::MissingColumns(_))));
    }

    #[test]
    fn test_rejections_are_logged_individually() {
        let (pipeline, _) = pipeline();
        let mut rx = pipeline.logger().subscribe();
        let csv = "timestamp,load_mw,region\n\
                   2025-05-01 09:00:00,abc,DE\n\
                   2025-05-01 10:00:00,-1,DE\n\
                   2025-05-01 11:00:00,50,DE\n";

        pipeline.load_bytes(csv.as_bytes(), &LoadOptions::default()).unwrap();

        let mut warnings = Vec::new();
        while let Ok(entry) = rx.try_recv() {
            if entry.level == LogLevel::Warning {
                warnings.push(entry.message);
            }
        }
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("row 2") && warnings[0].contains("abc"));
        assert!(warnings[1].contains("rule=load_mw > 0") && warnings[1].contains("value=-1"));
        assert_eq!(warnings[2], "Found 2 invalid records out of 3");
    }

    #[test]
    fn test_malformed_rows_do_not_abort() {
        let (pipeline, _) = pipeline();
        let csv = "timestamp,load_mw,region\n\
                   ,10,DE\n\
                   2025-05-01 10:00:00,10,\n\
                   2025-05-01 11:00:00,50,DE\n";

        let outcome = pipeline.load_bytes(csv.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(outcome.batch.len(), 1);
        let errors: Vec<_> = outcome.rejections.iter().map(|r| r.error.clone()).collect();
        assert_eq!(
            errors,
            vec![
                RecordError::Malformed(RowError::MissingField { field: "timestamp".into() }),
                RecordError::Malformed(RowError::MissingField { field: "region".into() }),
            ]
        );
    }

    #[test]
    fn test_explicit_batch_id() {
        let (pipeline, _) = pipeline();
        let options = LoadOptions {
            batch_id: Some("cycle-42".into()),
            delimiter: None,
        };
        let outcome = pipeline
            .load_bytes(b"timestamp,load_mw,region\n2025-05-01,1,DE\n", &options)
            .unwrap();
        assert_eq!(outcome.batch.batch_id(), "cycle-42");

        let options = LoadOptions {
            batch_id: Some(" ".into()),
            delimiter: None,
        };
        let err = pipeline
            .load_bytes(b"timestamp,load_mw,region\n2025-05-01,1,DE\n", &options)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Batch(_)));
    }

    #[test]
    fn test_process_marks_batch() {
        let (pipeline, clock) = pipeline();
        let csv = "timestamp,load_mw,region\n\
                   2025-05-01 00:15:00,100,DE\n\
                   2025-05-01 00:45:00,300,DE\n\
                   2025-05-01 01:00:00,50,DE\n";
        let mut batch = pipeline.load_bytes(csv.as_bytes(), &LoadOptions::default()).unwrap().batch;

        clock.advance(Duration::seconds(5));
        let report = pipeline.process(&mut batch);

        assert_eq!(batch.state(), BatchState::Processed);
        assert_eq!(report.processed_at, now() + Duration::seconds(5));
        assert_eq!(batch.processed_at(), Some(report.processed_at));
        assert_eq!(report.hourly_averages[&0], 200.0);
        assert_eq!(report.hourly_averages[&1], 50.0);
        assert_eq!(report.statistics.count, 3);
    }

    #[test]
    fn test_run_with_export() {
        let dir = tempdir().unwrap();
        let input = write_csv(
            dir.path(),
            "entsoe_load.csv",
            "timestamp;load_mw;region;resolution\n2025-05-01 10:00:00;45000.5;DE;PT60M\n2025-05-01 11:00:00;-1;DE;PT60M\n",
        );
        let export_path = dir.path().join("out").join("validated_load_data.json");

        let (pipeline, _) = pipeline();
        let options = RunOptions {
            load: LoadOptions::default(),
            export: Some(export_path.clone()),
        };
        let report = pipeline.run(&input, &options).unwrap();

        assert_eq!(report.batch.state(), BatchState::Processed);
        assert_eq!(report.rejections.len(), 1);
        assert_eq!(report.csv_info.delimiter, ';');
        assert_eq!(report.csv_info.row_count, 2);

        let back = export::read_batch_json(&export_path, pipeline.validator()).unwrap();
        assert_eq!(back, report.batch);
        assert_eq!(back.records()[0].extra()["resolution"], "PT60M");
    }

    #[test]
    fn test_run_missing_file() {
        let (pipeline, _) = pipeline();
        let err = pipeline
            .run(Path::new("/definitely/not/here.csv"), &RunOptions::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }

    #[test]
    fn test_validate_file_counts() {
        let dir = tempdir().unwrap();
        let input = write_csv(
            dir.path(),
            "loads.csv",
            "timestamp,load_mw,region\n2025-05-01,1,DE\n2025-05-01,0,DE\n2099-01-01,5,DE\n",
        );

        let (pipeline, _) = pipeline();
        let summary = pipeline.validate_file(&input, None).unwrap();
        assert_eq!(summary.csv_info.row_count, 3);
        assert_eq!(summary.valid, 1);
        let lines: Vec<usize> = summary.rejections.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![3, 4]);
    }

    #[tokio::test]
    async fn test_run_many_isolates_failures() {
        let dir = tempdir().unwrap();
        let good = write_csv(dir.path(), "de.csv", "timestamp,load_mw,region\n2025-05-01,10,DE\n2025-05-01,30,DE\n");
        let bad = write_csv(dir.path(), "fr.csv", "timestamp,load_mw,region\n2025-05-01,-10,FR\n");
        let other = write_csv(dir.path(), "nl load.csv", "timestamp,load_mw,region\n2025-05-01,7,NL\n");

        let (pipeline, _) = pipeline();
        let results = pipeline
            .run_many(vec![good.clone(), bad.clone(), other.clone()], None)
            .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, good);
        assert_eq!(results[1].0, bad);

        let de = results[0].1.as_ref().unwrap();
        assert_eq!(de.batch.batch_id(), "batch_20250501_120000_1_de");
        assert_eq!(de.processing.statistics.avg_load, 20.0);
        assert!(matches!(results[1].1, Err(PipelineError::EmptyBatch { .. })));

        let nl = results[2].1.as_ref().unwrap();
        assert_eq!(nl.batch.batch_id(), "batch_20250501_120000_3_nl-load");
        assert_eq!(nl.batch.state(), BatchState::Processed);
    }

    #[tokio::test]
    async fn test_run_many_same_stem_gets_distinct_ids() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        let csv = "timestamp,load_mw,region\n2025-05-01,10,DE\n";
        let first = write_csv(&dir.path().join("a"), "load.csv", csv);
        let second = write_csv(&dir.path().join("b"), "load.csv", csv);
        let spaced = write_csv(dir.path(), "a b.csv", csv);
        let dashed = write_csv(dir.path(), "a-b.csv", csv);

        let (pipeline, _) = pipeline();
        let results = pipeline.run_many(vec![first, second, spaced, dashed], None).await;

        let ids: Vec<String> = results
            .iter()
            .map(|(_, r)| r.as_ref().unwrap().batch.batch_id().to_string())
            .collect();
        assert_eq!(ids[0], "batch_20250501_120000_1_load");
        assert_eq!(ids[1], "batch_20250501_120000_2_load");

        let unique: std::collections::BTreeSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_csv_info_counts_empty_cells() {
        let (pipeline, _) = pipeline();
        let csv = "timestamp,load_mw,region,note\n2025-05-01,1,DE,\n2025-05-01,2,DE,ok\n";
        let outcome = pipeline.load_bytes(csv.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(outcome.csv_info.empty_cells[3], ("note".to_string(), 1));
        assert_eq!(outcome.csv_info.empty_cells[0].1, 0);
    }

    #[test]
    fn test_format_delimiter() {
        assert_eq!(format_delimiter('\t'), "\\t");
        assert_eq!(format_delimiter(';'), ";");
    }
}
