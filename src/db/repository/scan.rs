use std::str::FromStr;

use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::{DocType, ScanRecord};

pub fn insert_scans(conn: &Connection, scans: &[ScanRecord]) -> Result<usize, DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO scans (patient_id, doc_type, file_path, date)
         VALUES (?1, ?2, ?3, ?4)",
    )?;

    for scan in scans {
        stmt.execute(params![
            scan.patient_id,
            scan.doc_type.as_str(),
            scan.file_path,
            scan.date.to_string(),
        ])?;
    }

    Ok(scans.len())
}

/// Every indexed scan. Dates failing to parse abort the load.
pub fn get_all_scans(conn: &Connection) -> Result<Vec<ScanRecord>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT patient_id, doc_type, file_path, date FROM scans")?;

    let rows = stmt.query_map([], |row| {
        Ok(ScanRow {
            patient_id: row.get(0)?,
            doc_type: row.get(1)?,
            file_path: row.get(2)?,
            date: row.get(3)?,
        })
    })?;

    let mut scans = Vec::new();
    for row in rows {
        scans.push(scan_from_row(row?)?);
    }
    Ok(scans)
}

// Internal row type for ScanRecord mapping
struct ScanRow {
    patient_id: String,
    doc_type: String,
    file_path: String,
    date: chrono::NaiveDate,
}

fn scan_from_row(row: ScanRow) -> Result<ScanRecord, DatabaseError> {
    Ok(ScanRecord {
        patient_id: row.patient_id,
        doc_type: DocType::from_str(&row.doc_type)?,
        file_path: row.file_path,
        date: row.date,
    })
}
