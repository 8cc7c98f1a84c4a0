use std::path::Path;

use rusqlite::Connection;

use crate::db::{prosthetic_code_set, DatabaseError};
use crate::models::NewDeletedAct;

use super::{
    field, header_positions, open_reader, opt_text, parse_amount, parse_opt_date,
    require_columns, IngestError,
};

const EXPECTED_COLUMNS: &[&str] = &[
    "date",
    "patient_id",
    "patient_name",
    "doctor_id",
    "doctor_name",
    "code",
    "label",
    "amount",
    "source_file",
];

/// Loads a deleted-acts export. Codes are uppercased to line up with the
/// prosthetic reference.
pub fn load_deleted_file(path: &Path) -> Result<Vec<NewDeletedAct>, IngestError> {
    let mut reader = open_reader(path, b',')?;
    let positions = header_positions(reader.headers()?);
    require_columns(&positions, EXPECTED_COLUMNS, path)?;

    let mut acts = Vec::new();

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let line = line + 2;

        acts.push(NewDeletedAct {
            date: parse_opt_date(field(&record, &positions, "date"), "date", line)?,
            patient_id: field(&record, &positions, "patient_id").to_string(),
            patient_name: opt_text(field(&record, &positions, "patient_name")),
            doctor_id: field(&record, &positions, "doctor_id").to_string(),
            doctor_name: field(&record, &positions, "doctor_name").to_string(),
            code: field(&record, &positions, "code").to_uppercase(),
            label: field(&record, &positions, "label").to_string(),
            amount: parse_amount(field(&record, &positions, "amount"), "amount", line)?,
            source_file: field(&record, &positions, "source_file").to_string(),
        });
    }

    tracing::info!(path = %path.display(), rows = acts.len(), "Loaded deleted acts");
    Ok(acts)
}

/// Keeps only acts whose code appears in the prosthetic reference table.
/// Applied before insertion so the store never carries non-prosthetic acts.
pub fn filter_prosthetics(
    conn: &Connection,
    acts: Vec<NewDeletedAct>,
) -> Result<Vec<NewDeletedAct>, DatabaseError> {
    let reference = prosthetic_code_set(conn)?;
    let before = acts.len();

    let kept: Vec<NewDeletedAct> = acts
        .into_iter()
        .filter(|act| reference.contains(&act.code))
        .collect();

    tracing::info!(
        kept = kept.len(),
        dropped = before - kept.len(),
        "Filtered deleted acts against prosthetic reference"
    );
    Ok(kept)
}
