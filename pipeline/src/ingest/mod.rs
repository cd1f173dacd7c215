//! CSV row source with encoding and delimiter auto-detection.
//!
//! Turns a tabular load file into [`RawRow`]s. This module owns the
//! column-presence check (`timestamp`, `load_mw`, `region`) and the
//! conversion of text cells into typed values; the measurement rules live
//! in [`crate::validation`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::StringRecord;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{CsvError, CsvResult, Rejection, RowError};

/// Columns every load file must provide.
pub const REQUIRED_COLUMNS: [&str; 3] = ["timestamp", "load_mw", "region"];

/// Accepted naive timestamp layouts, tried in order after RFC 3339.
const NAIVE_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

// =============================================================================
// Rows
// =============================================================================

/// One data row, still as text.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based line in the source file.
    pub line: usize,
    pub timestamp: String,
    pub load_mw: String,
    pub region: String,
    /// Every non-required column, keyed by its header.
    pub extra: Map<String, Value>,
}

/// Typed inputs for the record validator.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRow {
    pub timestamp: DateTime<Utc>,
    pub load_mw: f64,
    pub region: String,
    pub extra: Map<String, Value>,
}

impl RawRow {
    /// Convert cells into typed values.
    pub fn parse(&self) -> Result<TypedRow, RowError> {
        let load_text = require("load_mw", &self.load_mw)?;
        let load_mw = parse_load(load_text)?;
        let timestamp = parse_timestamp(require("timestamp", &self.timestamp)?)?;
        let region = require("region", &self.region)?.to_string();

        Ok(TypedRow {
            timestamp,
            load_mw,
            region,
            extra: self.extra.clone(),
        })
    }
}

fn require<'a>(field: &str, value: &'a str) -> Result<&'a str, RowError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RowError::MissingField {
            field: field.to_string(),
        });
    }
    Ok(value)
}

fn parse_load(text: &str) -> Result<f64, RowError> {
    let unparseable = |reason: String| RowError::Unparseable {
        field: "load_mw".to_string(),
        value: text.to_string(),
        reason,
    };

    let value: f64 = text.parse().map_err(|e: std::num::ParseFloatError| unparseable(e.to_string()))?;
    if !value.is_finite() {
        return Err(unparseable("not a finite number".to_string()));
    }
    Ok(value)
}

/// Parse a point in time. Naive values are taken as UTC.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, RowError> {
    let text = text.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(naive) = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc());
    }

    Err(RowError::Unparseable {
        field: "timestamp".to_string(),
        value: text.to_string(),
        reason: "unrecognized date/time format".to_string(),
    })
}

// =============================================================================
// Parsed File
// =============================================================================

/// Result of reading a load file.
#[derive(Debug, Clone)]
pub struct ParsedCsv {
    /// Rows in file order.
    pub rows: Vec<RawRow>,
    /// Rows the CSV reader itself could not read.
    pub unreadable: Vec<Rejection>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers as written in the file
    pub headers: Vec<String>,
}

impl ParsedCsv {
    /// Data rows seen, readable or not.
    pub fn rows_read(&self) -> usize {
        self.rows.len() + self.unreadable.len()
    }

    /// Number of empty cells per column, in header order.
    pub fn empty_cells(&self) -> Vec<(String, usize)> {
        self.headers
            .iter()
            .map(|header| {
                let key = header.to_ascii_lowercase();
                let count = self
                    .rows
                    .iter()
                    .filter(|row| {
                        let cell = match key.as_str() {
                            "timestamp" => row.timestamp.as_str(),
                            "load_mw" => row.load_mw.as_str(),
                            "region" => row.region.as_str(),
                            _ => row.extra.get(header).and_then(Value::as_str).unwrap_or(""),
                        };
                        cell.trim().is_empty()
                    })
                    .count();
                (header.clone(), count)
            })
            .collect()
    }
}

// =============================================================================
// Detection
// =============================================================================

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(e) => return Err(CsvError::Encoding(e.to_string())),
        },
        // WHATWG maps the latin1 labels to windows-1252, a superset on printable bytes.
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    Ok(decoded)
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

// =============================================================================
// Parsing
// =============================================================================

/// Read a load file, auto-detecting encoding and (unless given) delimiter.
pub fn parse_file<P: AsRef<Path>>(path: P, delimiter: Option<char>) -> CsvResult<ParsedCsv> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes, delimiter)
}

/// Parse CSV bytes with auto-detection of encoding and (unless given) delimiter.
pub fn parse_bytes(bytes: &[u8], delimiter: Option<char>) -> CsvResult<ParsedCsv> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    parse_str(&content, delimiter, encoding)
}

/// Parse decoded CSV text with an explicit delimiter.
pub fn parse_str(content: &str, delimiter: char, encoding: String) -> CsvResult<ParsedCsv> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }
    if !delimiter.is_ascii() {
        return Err(CsvError::InvalidDelimiter(delimiter));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let header_record = reader.headers()?.clone();
    if header_record.iter().all(|h| h.trim().is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let headers: Vec<String> = header_record.iter().map(clean_header).collect();
    let columns = ColumnMap::resolve(&headers)?;

    let mut rows = Vec::new();
    let mut unreadable = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header line; lines are 1-based.
        let fallback_line = idx + 2;

        match result {
            Ok(record) => {
                let line = record
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_line);
                rows.push(columns.row(&record, &headers, line));
            }
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_line);
                unreadable.push(Rejection {
                    line,
                    error: RowError::Unreadable {
                        reason: e.to_string(),
                    }
                    .into(),
                });
            }
        }
    }

    Ok(ParsedCsv {
        rows,
        unreadable,
        encoding,
        delimiter,
        headers,
    })
}

fn clean_header(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_string()
}

/// Column positions of the required fields.
struct ColumnMap {
    timestamp: usize,
    load_mw: usize,
    region: usize,
}

impl ColumnMap {
    fn resolve(headers: &[String]) -> CsvResult<Self> {
        let mut index: HashMap<String, usize> = HashMap::new();
        for (i, name) in headers.iter().enumerate() {
            index.entry(name.to_ascii_lowercase()).or_insert(i);
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !index.contains_key(**col))
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(CsvError::MissingColumns(missing));
        }

        Ok(Self {
            timestamp: index["timestamp"],
            load_mw: index["load_mw"],
            region: index["region"],
        })
    }

    fn is_required(&self, i: usize) -> bool {
        i == self.timestamp || i == self.load_mw || i == self.region
    }

    fn row(&self, record: &StringRecord, headers: &[String], line: usize) -> RawRow {
        let cell = |i: usize| record.get(i).unwrap_or("").to_string();

        let extra = headers
            .iter()
            .enumerate()
            .filter(|(i, name)| !self.is_required(*i) && !name.is_empty())
            .map(|(i, name)| (name.clone(), Value::String(cell(i))))
            .collect();

        RawRow {
            line,
            timestamp: cell(self.timestamp),
            load_mw: cell(self.load_mw),
            region: cell(self.region),
            extra,
        }
    }
}
