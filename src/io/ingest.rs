//! CSV ingest and validation.
//!
//! This module turns a sales-history CSV into a clean series of
//! `(date, sales)` points that are safe to fit.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Fail-fast row validation** with 1-based line numbers (exit code 3)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{DatasetStats, SeriesPoint};
use crate::error::AppError;

/// Column name for the observation timestamp. Matched case-sensitively.
pub const DATE_COLUMN: &str = "Date";
/// Column name for the observed quantity. Matched case-sensitively.
pub const SALES_COLUMN: &str = "Sales";

/// Ingest output: parsed points (in file order) plus summary stats.
#[derive(Debug, Clone)]
pub struct IngestedSeries {
    pub points: Vec<SeriesPoint>,
    pub stats: DatasetStats,
    pub rows_read: usize,
}

/// Load and validate a sales-history CSV from disk.
pub fn load_sales_series(path: &Path) -> Result<IngestedSeries, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    read_sales_series(file)
}

/// Validate and parse a sales-history CSV from any reader.
///
/// Unlike lenient ingest pipelines that skip bad rows, a malformed row here
/// aborts the run with its line number. An unnoticed hole in a sales history
/// silently skews the forecast, so the file must be fixed instead.
pub fn read_sales_series<R: Read>(input: R) -> Result<IngestedSeries, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let date_idx = header_map.get(DATE_COLUMN).copied();
    let sales_idx = header_map.get(SALES_COLUMN).copied();
    let (Some(date_idx), Some(sales_idx)) = (date_idx, sales_idx) else {
        return Err(AppError::new(
            2,
            format!(
                "The CSV must contain `{DATE_COLUMN}` and `{SALES_COLUMN}` columns \
                 (found: {}).",
                format_header_list(&headers)
            ),
        ));
    };

    let mut points = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = result
            .map_err(|e| AppError::new(3, format!("CSV parse error on line {line}: {e}")))?;

        points.push(parse_row(&record, date_idx, sales_idx, line)?);
    }

    if points.is_empty() {
        return Err(AppError::new(
            3,
            "The CSV contains no data rows after the header.",
        ));
    }

    let stats = compute_stats(&points);

    Ok(IngestedSeries {
        points,
        stats,
        rows_read,
    })
}

fn parse_row(
    record: &StringRecord,
    date_idx: usize,
    sales_idx: usize,
    line: usize,
) -> Result<SeriesPoint, AppError> {
    let date_raw = get_required(record, date_idx, DATE_COLUMN, line)?;
    let sales_raw = get_required(record, sales_idx, SALES_COLUMN, line)?;

    let ds = parse_date(date_raw)
        .map_err(|e| AppError::new(3, format!("Line {line}: {e}")))?;

    let y = sales_raw.parse::<f64>().map_err(|_| {
        AppError::new(
            3,
            format!("Line {line}: invalid `{SALES_COLUMN}` value '{sales_raw}' (expected a number)."),
        )
    })?;
    if !y.is_finite() {
        return Err(AppError::new(
            3,
            format!("Line {line}: non-finite `{SALES_COLUMN}` value '{sales_raw}'."),
        ));
    }

    Ok(SeriesPoint { ds, y })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿Date"). If we don't strip it, schema validation
    // will incorrectly report missing columns. Case is preserved: the schema
    // match is deliberately case-sensitive.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn format_header_list(headers: &StringRecord) -> String {
    let names: Vec<String> = headers
        .iter()
        .map(|h| format!("`{}`", normalize_header_name(h)))
        .collect();
    if names.is_empty() {
        "no columns".to_string()
    } else {
        names.join(", ")
    }
}

fn get_required<'a>(
    record: &'a StringRecord,
    idx: usize,
    name: &str,
    line: usize,
) -> Result<&'a str, AppError> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::new(3, format!("Line {line}: missing `{name}` value.")))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // We recommend ISO dates (`YYYY-MM-DD`), but sales exports in practice
    // often use `DD/MM/YYYY` or `DD-MM-YYYY`. We accept a small set of common
    // formats to reduce friction while keeping parsing deterministic.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "invalid `{DATE_COLUMN}` value '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

fn compute_stats(points: &[SeriesPoint]) -> DatasetStats {
    let mut ds_min = points[0].ds;
    let mut ds_max = points[0].ds;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for p in points {
        ds_min = ds_min.min(p.ds);
        ds_max = ds_max.max(p.ds);
        y_min = y_min.min(p.y);
        y_max = y_max.max(p.y);
    }

    DatasetStats {
        n_points: points.len(),
        ds_min,
        ds_max,
        y_min,
        y_max,
    }
}
