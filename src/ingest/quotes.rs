use std::path::Path;
use std::str::FromStr;

use crate::models::{QuoteRecord, QuoteStatus};

use super::{
    field, header_positions, open_reader, parse_amount, parse_opt_date, require_columns,
    IngestError,
};

const REQUIRED_COLUMNS: &[&str] = &[
    "quote_id",
    "status",
    "date",
    "patient_id",
    "doctor_id",
    "code",
    "amount",
    "source_file",
];

/// Loads a quotes export. `declared_material` and `tooth_number` are
/// optional columns; rows whose status is not proposed, accepted or
/// deleted are dropped with a warning, matching upstream exports that mix
/// in draft rows.
pub fn load_quotes_file(path: &Path) -> Result<Vec<QuoteRecord>, IngestError> {
    let mut reader = open_reader(path, b',')?;
    let positions = header_positions(reader.headers()?);
    require_columns(&positions, REQUIRED_COLUMNS, path)?;

    let mut quotes = Vec::new();
    let mut dropped = 0usize;

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let line = line + 2;

        let raw_status = field(&record, &positions, "status").to_lowercase();
        let Ok(status) = QuoteStatus::from_str(&raw_status) else {
            dropped += 1;
            continue;
        };

        quotes.push(QuoteRecord {
            quote_id: field(&record, &positions, "quote_id").to_string(),
            status,
            date: parse_opt_date(field(&record, &positions, "date"), "date", line)?,
            patient_id: field(&record, &positions, "patient_id").to_string(),
            doctor_id: field(&record, &positions, "doctor_id").to_string(),
            code: field(&record, &positions, "code").to_string(),
            amount: parse_amount(field(&record, &positions, "amount"), "amount", line)?,
            declared_material: field(&record, &positions, "declared_material").to_string(),
            tooth_number: field(&record, &positions, "tooth_number").to_string(),
            source_file: field(&record, &positions, "source_file").to_string(),
        });
    }

    if dropped > 0 {
        tracing::warn!(rows = dropped, "Dropped quote rows with unrecognized status");
    }
    tracing::info!(path = %path.display(), rows = quotes.len(), "Loaded quotes");
    Ok(quotes)
}
