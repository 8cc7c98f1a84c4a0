use std::str::FromStr;

use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::{QuoteRecord, QuoteStatus};

/// Insert or replace quote lines keyed by (quote_id, code). Status changes
/// arrive through re-import, so replace is the correct conflict policy.
pub fn upsert_quotes(conn: &Connection, quotes: &[QuoteRecord]) -> Result<usize, DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT OR REPLACE INTO quotes
         (quote_id, status, date, patient_id, doctor_id, code, amount,
          declared_material, tooth_number, source_file)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;

    for quote in quotes {
        stmt.execute(params![
            quote.quote_id,
            quote.status.as_str(),
            quote.date.map(|d| d.to_string()),
            quote.patient_id,
            quote.doctor_id,
            quote.code,
            quote.amount,
            quote.declared_material,
            quote.tooth_number,
            quote.source_file,
        ])?;
    }

    Ok(quotes.len())
}

pub fn get_all_quotes(conn: &Connection) -> Result<Vec<QuoteRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT quote_id, status, date, patient_id, doctor_id, code, amount,
                declared_material, tooth_number, source_file
         FROM quotes",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(QuoteRow {
            quote_id: row.get(0)?,
            status: row.get(1)?,
            date: row.get(2)?,
            patient_id: row.get(3)?,
            doctor_id: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            code: row.get(5)?,
            amount: row.get::<_, Option<f64>>(6)?.unwrap_or(0.0),
            declared_material: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
            tooth_number: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
            source_file: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
        })
    })?;

    let mut quotes = Vec::new();
    for row in rows {
        quotes.push(quote_from_row(row?)?);
    }
    Ok(quotes)
}

// Internal row type for QuoteRecord mapping
struct QuoteRow {
    quote_id: String,
    status: String,
    date: Option<chrono::NaiveDate>,
    patient_id: String,
    doctor_id: String,
    code: String,
    amount: f64,
    declared_material: String,
    tooth_number: String,
    source_file: String,
}

fn quote_from_row(row: QuoteRow) -> Result<QuoteRecord, DatabaseError> {
    Ok(QuoteRecord {
        quote_id: row.quote_id,
        status: QuoteStatus::from_str(&row.status)?,
        date: row.date,
        patient_id: row.patient_id,
        doctor_id: row.doctor_id,
        code: row.code,
        amount: row.amount,
        declared_material: row.declared_material,
        tooth_number: row.tooth_number,
        source_file: row.source_file,
    })
}
