use std::collections::HashSet;

use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::ProcedureCode;

/// Upsert reference rows by code, last write wins on conflict.
pub fn upsert_procedure_codes(
    conn: &Connection,
    codes: &[ProcedureCode],
) -> Result<usize, DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO ccam_prosthetics (code, label, is_prosthetic, materials, basket)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(code) DO UPDATE SET
             label = excluded.label,
             is_prosthetic = excluded.is_prosthetic,
             materials = excluded.materials,
             basket = excluded.basket",
    )?;

    for code in codes {
        stmt.execute(params![
            code.code,
            code.label,
            code.is_prosthetic as i64,
            code.materials,
            code.basket,
        ])?;
    }

    Ok(codes.len())
}

pub fn get_procedure_code(
    conn: &Connection,
    code: &str,
) -> Result<Option<ProcedureCode>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT code, label, is_prosthetic, materials, basket
         FROM ccam_prosthetics WHERE code = ?1",
    )?;

    let result = stmt.query_row(params![code], map_procedure_code);
    match result {
        Ok(found) => Ok(Some(found)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_all_procedure_codes(conn: &Connection) -> Result<Vec<ProcedureCode>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT code, label, is_prosthetic, materials, basket
         FROM ccam_prosthetics ORDER BY code",
    )?;

    let rows = stmt.query_map([], map_procedure_code)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Codes present in the reference, for the prosthetics filter applied
/// before any billing import reaches the store.
pub fn prosthetic_code_set(conn: &Connection) -> Result<HashSet<String>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT code FROM ccam_prosthetics")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

fn map_procedure_code(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProcedureCode> {
    Ok(ProcedureCode {
        code: row.get(0)?,
        label: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        is_prosthetic: row.get::<_, i64>(2)? != 0,
        materials: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        basket: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
    })
}
