use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::{DeletedActRecord, NewDeletedAct};

pub fn insert_deleted_acts(
    conn: &Connection,
    acts: &[NewDeletedAct],
) -> Result<usize, DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO deleted_acts
         (date, patient_id, patient_name, doctor_id, doctor_name, code, label, amount, source_file)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;

    for act in acts {
        stmt.execute(params![
            act.date.map(|d| d.to_string()),
            act.patient_id,
            act.patient_name,
            act.doctor_id,
            act.doctor_name,
            act.code,
            act.label,
            act.amount,
            act.source_file,
        ])?;
    }

    Ok(acts.len())
}

pub fn get_all_deleted_acts(conn: &Connection) -> Result<Vec<DeletedActRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, date, patient_id, patient_name, doctor_id, doctor_name,
                code, label, amount, source_file
         FROM deleted_acts",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(DeletedActRecord {
            id: row.get(0)?,
            date: row.get(1)?,
            patient_id: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            patient_name: row.get(3)?,
            doctor_id: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            doctor_name: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            code: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
            label: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
            amount: row.get::<_, Option<f64>>(8)?.unwrap_or(0.0),
            source_file: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}
