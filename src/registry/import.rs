use std::path::Path;
use std::time::Instant;

use chrono::Local;
use csv::StringRecord;
use rusqlite::Connection;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::db::{
    create_rpps_indexes, insert_import_document, insert_professionals, DatabaseError,
};
use crate::models::{ImportDocument, Professional};
use crate::text::is_deregistered;

use super::matcher::is_valid_rpps;
use super::RegistryError;

/// Public extraction page the registry file comes from.
pub const RPPS_SOURCE_URL: &str = "https://annuaire.sante.fr/web/site-pro/extractions-publiques";

const IMPORT_BATCH_SIZE: usize = 1000;

// Column headers of the official "Personne activité" extraction.
const COL_RPPS_ID: &str = "Identifiant PP";
const COL_TITLE: &str = "Libellé civilité d'exercice";
const COL_LAST_NAME: &str = "Nom d'exercice";
const COL_FIRST_NAME: &str = "Prénom d'exercice";
const COL_PROFESSION_CODE: &str = "Code profession";
const COL_PROFESSION_LABEL: &str = "Libellé profession";
const COL_SPECIALTY_CODE: &str = "Code savoir-faire";
const COL_SPECIALTY_LABEL: &str = "Libellé savoir-faire";
const COL_STATUS: &str = "Libellé rôle";
const COL_STREET_NUMBER: &str = "Numéro Voie (coord. structure)";
const COL_STREET_LABEL: &str = "Libellé Voie (coord. structure)";
const COL_POSTAL_CODE: &str = "Code postal (coord. structure)";
const COL_CITY: &str = "Libellé commune (coord. structure)";

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub rows_read: usize,
    pub rows_inserted: usize,
    pub rows_skipped: usize,
}

/// Imports the pipe-delimited official extraction into the registry.
///
/// Rows without a valid 11-digit identifier are skipped and counted.
/// Duplicate identifiers keep the first occurrence. Search indexes are
/// created after the data lands, then the source file's provenance is
/// recorded.
pub fn import_registry(
    conn: &mut Connection,
    path: &Path,
    extraction_version: &str,
) -> Result<ImportReport, RegistryError> {
    if !path.exists() {
        return Err(RegistryError::FileNotFound(path.to_path_buf()));
    }

    let started = Instant::now();
    // Official extraction rows are occasionally ragged; missing trailing
    // fields read as empty.
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let Some(id_idx) = column(COL_RPPS_ID) else {
        return Err(RegistryError::MissingColumn(COL_RPPS_ID.to_string()));
    };

    let title_idx = column(COL_TITLE);
    let last_name_idx = column(COL_LAST_NAME);
    let first_name_idx = column(COL_FIRST_NAME);
    let profession_code_idx = column(COL_PROFESSION_CODE);
    let profession_label_idx = column(COL_PROFESSION_LABEL);
    let specialty_code_idx = column(COL_SPECIALTY_CODE);
    let specialty_label_idx = column(COL_SPECIALTY_LABEL);
    let status_idx = column(COL_STATUS);
    let street_number_idx = column(COL_STREET_NUMBER);
    let street_label_idx = column(COL_STREET_LABEL);
    let postal_code_idx = column(COL_POSTAL_CODE);
    let city_idx = column(COL_CITY);

    let today = Local::now().date_naive().to_string();
    let version = (!extraction_version.is_empty()).then(|| extraction_version.to_string());

    let mut report = ImportReport::default();
    let mut batch: Vec<Professional> = Vec::with_capacity(IMPORT_BATCH_SIZE);

    let tx = conn.transaction().map_err(DatabaseError::from)?;

    for record in reader.records() {
        let record = record?;
        report.rows_read += 1;

        let rpps_id = record.get(id_idx).unwrap_or_default().trim().to_string();
        if !is_valid_rpps(&rpps_id) {
            report.rows_skipped += 1;
            tracing::warn!(rpps_id, "Invalid RPPS ID skipped");
            continue;
        }

        let field = |idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        batch.push(Professional {
            rpps_id,
            title: field(title_idx),
            last_name: field(last_name_idx),
            first_name: field(first_name_idx),
            profession_code: field(profession_code_idx),
            profession_label: field(profession_label_idx),
            specialty_code: field(specialty_code_idx),
            specialty_label: field(specialty_label_idx),
            status: field(status_idx),
            practice_address: practice_address(&record, street_number_idx, street_label_idx),
            postal_code: field(postal_code_idx),
            city: field(city_idx),
            date_registered: Some(today.clone()),
            date_updated: Some(today.clone()),
            date_import: Some(today.clone()),
            source_url: Some(RPPS_SOURCE_URL.to_string()),
            version_extraction: version.clone(),
        });

        if batch.len() >= IMPORT_BATCH_SIZE {
            report.rows_inserted += insert_professionals(&tx, &batch)?;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        report.rows_inserted += insert_professionals(&tx, &batch)?;
    }

    tx.commit().map_err(DatabaseError::from)?;

    create_rpps_indexes(conn)?;
    store_import_document(conn, path)?;

    tracing::info!(
        rows_read = report.rows_read,
        rows_inserted = report.rows_inserted,
        rows_skipped = report.rows_skipped,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Registry import complete"
    );
    Ok(report)
}

fn practice_address(
    record: &StringRecord,
    number_idx: Option<usize>,
    label_idx: Option<usize>,
) -> Option<String> {
    let part = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or_default().trim();

    let joined = format!("{} {}", part(number_idx), part(label_idx))
        .trim()
        .to_string();
    (!joined.is_empty()).then_some(joined)
}

/// Records the source file's name, size, digest and import date.
pub fn store_import_document(
    conn: &Connection,
    path: &Path,
) -> Result<ImportDocument, RegistryError> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;

    let size_bytes = std::fs::metadata(path)?.len();
    let doc = ImportDocument {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        file_size_mb: (size_bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0,
        sha256: format!("{:x}", hasher.finalize()),
        import_date: Local::now().date_naive(),
    };

    insert_import_document(conn, &doc)?;
    tracing::info!(file = %doc.file_name, sha256 = %doc.sha256, "Import document recorded");
    Ok(doc)
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QualityReport {
    pub total_records: i64,
    pub distinct_rpps_ids: i64,
    pub duplicate_records: i64,
    pub missing_critical_fields: i64,
    pub missing_addresses: i64,
    pub deregistered: i64,
    pub status_distribution: Vec<(String, i64)>,
    pub top_professions: Vec<(String, i64)>,
}

/// Post-import quality statistics over the registry contents.
pub fn quality_report(conn: &Connection) -> Result<QualityReport, DatabaseError> {
    let (total_records, distinct_rpps_ids) = conn.query_row(
        "SELECT COUNT(*), COUNT(DISTINCT rpps_id) FROM referentiel_rpps",
        [],
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
    )?;

    let missing_critical_fields: i64 = conn.query_row(
        "SELECT COUNT(*) FROM referentiel_rpps
         WHERE (last_name IS NULL OR last_name = '')
            OR (first_name IS NULL OR first_name = '')
            OR (profession_code IS NULL OR profession_code = '')",
        [],
        |row| row.get(0),
    )?;

    let missing_addresses: i64 = conn.query_row(
        "SELECT COUNT(*) FROM referentiel_rpps
         WHERE practice_address IS NULL OR practice_address = ''",
        [],
        |row| row.get(0),
    )?;

    let status_distribution = grouped_counts(
        conn,
        "SELECT status, COUNT(*) FROM referentiel_rpps
         GROUP BY status ORDER BY COUNT(*) DESC",
    )?;

    let top_professions = grouped_counts(
        conn,
        "SELECT profession_label, COUNT(*) FROM referentiel_rpps
         GROUP BY profession_label ORDER BY COUNT(*) DESC LIMIT 10",
    )?;

    let deregistered = {
        let mut stmt = conn.prepare("SELECT status FROM referentiel_rpps")?;
        let rows = stmt.query_map([], |row| row.get::<_, Option<String>>(0))?;

        let mut count = 0i64;
        for row in rows {
            if is_deregistered(row?.as_deref()) {
                count += 1;
            }
        }
        count
    };

    let report = QualityReport {
        total_records,
        distinct_rpps_ids,
        duplicate_records: total_records - distinct_rpps_ids,
        missing_critical_fields,
        missing_addresses,
        deregistered,
        status_distribution,
        top_professions,
    };

    if report.duplicate_records > 0 {
        tracing::warn!(duplicates = report.duplicate_records, "Registry holds duplicate RPPS IDs");
    }
    if report.missing_critical_fields > 0 {
        tracing::warn!(
            records = report.missing_critical_fields,
            "Records with missing critical fields"
        );
    }
    if report.missing_addresses > 0 {
        tracing::warn!(records = report.missing_addresses, "Records missing practice address");
    }
    tracing::info!(
        total = report.total_records,
        deregistered = report.deregistered,
        "Registry quality checks complete"
    );

    Ok(report)
}

fn grouped_counts(conn: &Connection, sql: &str) -> Result<Vec<(String, i64)>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, Option<String>>(0)?.unwrap_or_default(),
            row.get::<_, i64>(1)?,
        ))
    })?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)
}
