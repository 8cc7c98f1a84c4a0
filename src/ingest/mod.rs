//! File ingestion into the compliance store.
//!
//! Each loader reads one CSV export, validates its header against the
//! expected columns up front, and returns typed records ready for the
//! repository layer. Header matching is case-insensitive; a missing
//! required column names every absent column at once.

pub mod ccam;
pub mod deleted_acts;
pub mod invoices;
pub mod quotes;
pub mod scans;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use crate::db::DatabaseError;

pub use ccam::{load_ccam_csv, load_ccam_file, load_ccam_txt};
pub use deleted_acts::{filter_prosthetics, load_deleted_file};
pub use invoices::load_invoices_file;
pub use quotes::load_quotes_file;
pub use scans::load_scans_file;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("File does not exist: {0}")]
    FileNotFound(PathBuf),

    #[error("Missing columns in {file}: {columns:?}")]
    MissingColumns { file: String, columns: Vec<String> },

    #[error("Invalid doc_type(s) found: {0:?}")]
    InvalidDocTypes(Vec<String>),

    #[error("Invalid {field} value {value:?} on line {line}")]
    InvalidField {
        field: &'static str,
        value: String,
        line: usize,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Header name (trimmed, lowercased) to column position.
pub(crate) fn header_positions(headers: &csv::StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim().to_lowercase(), idx))
        .collect()
}

pub(crate) fn require_columns(
    positions: &HashMap<String, usize>,
    required: &[&str],
    file: &Path,
) -> Result<(), IngestError> {
    let mut missing: Vec<String> = required
        .iter()
        .filter(|col| !positions.contains_key(**col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        missing.sort();
        Err(IngestError::MissingColumns {
            file: file.display().to_string(),
            columns: missing,
        })
    }
}

pub(crate) fn open_reader(
    path: &Path,
    delimiter: u8,
) -> Result<csv::Reader<std::fs::File>, IngestError> {
    if !path.exists() {
        return Err(IngestError::FileNotFound(path.to_path_buf()));
    }
    Ok(csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?)
}

pub(crate) fn field<'r>(
    record: &'r csv::StringRecord,
    positions: &HashMap<String, usize>,
    name: &str,
) -> &'r str {
    positions
        .get(name)
        .and_then(|idx| record.get(*idx))
        .unwrap_or_default()
        .trim()
}

pub(crate) fn parse_date(
    value: &str,
    field: &'static str,
    line: usize,
) -> Result<NaiveDate, IngestError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| IngestError::InvalidField {
        field,
        value: value.to_string(),
        line,
    })
}

pub(crate) fn parse_opt_date(
    value: &str,
    field: &'static str,
    line: usize,
) -> Result<Option<NaiveDate>, IngestError> {
    if value.is_empty() {
        return Ok(None);
    }
    parse_date(value, field, line).map(Some)
}

pub(crate) fn parse_amount(
    value: &str,
    field: &'static str,
    line: usize,
) -> Result<f64, IngestError> {
    if value.is_empty() {
        return Ok(0.0);
    }
    value.parse().map_err(|_| IngestError::InvalidField {
        field,
        value: value.to_string(),
        line,
    })
}

pub(crate) fn parse_qty(
    value: &str,
    field: &'static str,
    line: usize,
) -> Result<i64, IngestError> {
    if value.is_empty() {
        return Ok(0);
    }
    value.parse().map_err(|_| IngestError::InvalidField {
        field,
        value: value.to_string(),
        line,
    })
}

/// Blank values become `None` so they land as SQL NULL.
pub(crate) fn opt_text(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
