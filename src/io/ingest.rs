//! CSV ingest and normalization.
//!
//! This module turns a CSV with a header row into clean, x-sorted observations
//! that are safe to fit.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (stable sort by x, no hidden randomness)

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use log::warn;

use crate::domain::{DatasetStats, Observation};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: sorted observations + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub points: Vec<Observation>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

impl IngestedData {
    /// Wrap already-clean points (e.g. a generated sample), sorting them by x.
    pub fn from_points(mut points: Vec<Observation>) -> Result<Self, AppError> {
        points.sort_by(|a, b| a.x.total_cmp(&b.x));
        let stats = DatasetStats::from_points(&points)
            .ok_or_else(|| AppError::new(3, "No valid points to fit."))?;
        let n = points.len();
        Ok(Self {
            points,
            stats,
            row_errors: Vec::new(),
            rows_read: n,
            rows_used: n,
        })
    }

    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }
}

/// x values read for prediction, sorted ascending.
#[derive(Debug, Clone)]
pub struct IngestedXs {
    pub xs: Vec<f64>,
    pub row_errors: Vec<RowError>,
}

/// Load `(x, y)` observations from a CSV file.
pub fn load_observations(path: &Path, x_col: &str, y_col: &str) -> Result<IngestedData, AppError> {
    let file = open(path)?;
    read_observations(file, x_col, y_col)
}

/// Load x values (for prediction) from a CSV file.
pub fn load_xs(path: &Path, x_col: &str) -> Result<IngestedXs, AppError> {
    let file = open(path)?;
    read_xs(file, x_col)
}

pub fn read_observations<R: std::io::Read>(
    reader: R,
    x_col: &str,
    y_col: &str,
) -> Result<IngestedData, AppError> {
    let table = read_numeric_columns(reader, &[x_col, y_col])?;
    let rows_read = table.rows_read;

    let points: Vec<Observation> = table
        .rows
        .iter()
        .map(|row| Observation { x: row[0], y: row[1] })
        .collect();

    if points.is_empty() {
        return Err(AppError::new(3, "No valid rows remain after validation."));
    }

    let mut data = IngestedData::from_points(points)?;
    data.row_errors = table.row_errors;
    data.rows_read = rows_read;
    Ok(data)
}

pub fn read_xs<R: std::io::Read>(reader: R, x_col: &str) -> Result<IngestedXs, AppError> {
    let table = read_numeric_columns(reader, &[x_col])?;
    let mut xs: Vec<f64> = table.rows.iter().map(|row| row[0]).collect();
    xs.sort_by(|a, b| a.total_cmp(b));
    Ok(IngestedXs {
        xs,
        row_errors: table.row_errors,
    })
}

fn open(path: &Path) -> Result<File, AppError> {
    File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))
}

struct NumericTable {
    rows: Vec<Vec<f64>>,
    row_errors: Vec<RowError>,
    rows_read: usize,
}

/// Read the named columns as finite floats, skipping (and recording) bad rows.
fn read_numeric_columns<R: std::io::Read>(reader: R, columns: &[&str]) -> Result<NumericTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let indices = columns
        .iter()
        .map(|name| {
            header_map
                .get(&normalize_header_name(name))
                .copied()
                .ok_or_else(|| AppError::new(2, format!("Missing required column: `{name}`")))
        })
        .collect::<Result<Vec<usize>, AppError>>()?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: 1-based line numbers, plus the header line.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| {
                columns
                    .iter()
                    .zip(&indices)
                    .map(|(name, &i)| parse_f64(&record, i, name))
                    .collect::<Result<Vec<f64>, String>>()
            });

        match parsed {
            Ok(row) => rows.push(row),
            Err(message) => {
                warn!("skipping CSV line {line}: {message}");
                row_errors.push(RowError { line, message });
            }
        }
    }

    Ok(NumericTable {
        rows,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_f64(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing value: `{name}`"))?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid number for `{name}`: '{raw}'"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite value for `{name}`: '{raw}'"))
    }
}
