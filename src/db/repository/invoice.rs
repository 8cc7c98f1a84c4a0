use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::InvoiceRecord;

/// Insert or replace invoice lines keyed by (invoice_no, code), so a
/// re-imported export does not duplicate lines.
pub fn upsert_invoices(conn: &Connection, invoices: &[InvoiceRecord]) -> Result<usize, DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT OR REPLACE INTO invoices
         (invoice_no, date, patient_id, patient_name, doctor_id, doctor_name,
          code, qty, amount, fse_no, source_file)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )?;

    for inv in invoices {
        stmt.execute(params![
            inv.invoice_no,
            inv.date.to_string(),
            inv.patient_id,
            inv.patient_name,
            inv.doctor_id,
            inv.doctor_name,
            inv.code,
            inv.qty,
            inv.amount,
            inv.fse_no,
            inv.source_file,
        ])?;
    }

    Ok(invoices.len())
}

/// Every invoice line. Dates failing to parse abort the load.
pub fn get_all_invoices(conn: &Connection) -> Result<Vec<InvoiceRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT invoice_no, date, patient_id, patient_name, doctor_id, doctor_name,
                code, qty, amount, fse_no, source_file
         FROM invoices",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(InvoiceRecord {
            invoice_no: row.get(0)?,
            date: row.get(1)?,
            patient_id: row.get(2)?,
            patient_name: row.get(3)?,
            doctor_id: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            doctor_name: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            code: row.get(6)?,
            qty: row.get::<_, Option<i64>>(7)?.unwrap_or(0),
            amount: row.get::<_, Option<f64>>(8)?.unwrap_or(0.0),
            fse_no: row.get(9)?,
            source_file: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}
