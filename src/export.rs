//! CSV and JSON export of reconciliation and validation results.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::checks::ValidationReport;
use crate::engine::ReconciliationRow;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// French column headers of the review spreadsheet, written even when the
/// result set is empty.
const RECONCILIATION_HEADERS: &[&str] = &[
    "Patient",
    "Date",
    "Matériau Devis",
    "Matériau Fiche LABO",
    "Contrôlé",
    "Validé",
    "Statut",
];

pub fn write_reconciliation_csv(
    rows: &[ReconciliationRow],
    path: &Path,
) -> Result<(), ExportError> {
    write_rows(rows, RECONCILIATION_HEADERS, path)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "Wrote reconciliation export");
    Ok(())
}

/// Writes one CSV per validation rule into `dir` and returns the paths.
pub fn write_validation_csvs(
    report: &ValidationReport,
    dir: &Path,
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(dir)?;

    let deleted_quotes = dir.join("deleted_quotes.csv");
    write_rows(
        &report.deleted_quotes,
        &[
            "quote_id",
            "patient_id",
            "doctor_id",
            "code",
            "quote_date",
            "scan_path",
            "invoice_no",
            "fse_no",
            "invoice_date",
            "flag",
        ],
        &deleted_quotes,
    )?;

    let material_mismatches = dir.join("material_mismatches.csv");
    write_rows(
        &report.material_mismatches,
        &[
            "patient_id",
            "quote_id",
            "declared_material",
            "lab_material",
            "doc_path",
            "flag",
        ],
        &material_mismatches,
    )?;

    let deleted_prostheses = dir.join("deleted_prostheses.csv");
    write_rows(
        &report.deleted_prostheses,
        &[
            "patient_id",
            "doctor_name",
            "code",
            "label",
            "date",
            "source_file",
            "flag",
        ],
        &deleted_prostheses,
    )?;

    let insurance_docs = dir.join("insurance_docs.csv");
    write_rows(
        &report.missing_insurance_docs,
        &["patient_id", "quote_id", "invoice_id", "missing_type", "flag"],
        &insurance_docs,
    )?;

    let recreated_quotes = dir.join("recreated_quotes.csv");
    write_rows(
        &report.recreated_quotes,
        &[
            "patient_id",
            "doctor_id",
            "code",
            "tooth_number",
            "material",
            "new_quote_date",
            "deleted_quote_id",
            "duplicate_quote_id",
            "flag",
        ],
        &recreated_quotes,
    )?;

    let paths = vec![
        deleted_quotes,
        material_mismatches,
        deleted_prostheses,
        insurance_docs,
        recreated_quotes,
    ];
    tracing::info!(dir = %dir.display(), files = paths.len(), "Wrote validation exports");
    Ok(paths)
}

/// Whole report as one JSON document, for downstream tooling.
pub fn write_validation_json(report: &ValidationReport, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    tracing::info!(path = %path.display(), "Wrote validation JSON");
    Ok(())
}

fn write_rows<T: Serialize>(rows: &[T], headers: &[&str], path: &Path) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;

    // serialize() only emits the header row when it sees a first record.
    if rows.is_empty() {
        writer.write_record(headers)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    Ok(())
}
