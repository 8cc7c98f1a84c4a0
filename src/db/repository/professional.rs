use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::Professional;

const PROFESSIONAL_COLUMNS: &str = "rpps_id, title, last_name, first_name, profession_code, \
     profession_label, specialty_code, specialty_label, status, practice_address, \
     postal_code, city, date_registered, date_updated, date_import, source_url, \
     version_extraction";

/// Bulk insert registry rows. Duplicated rpps_id values are ignored, so a
/// re-run of the same extraction file is harmless. Returns the number of
/// rows actually inserted.
pub fn insert_professionals(
    conn: &Connection,
    professionals: &[Professional],
) -> Result<usize, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "INSERT OR IGNORE INTO referentiel_rpps ({PROFESSIONAL_COLUMNS})
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)"
    ))?;

    let mut inserted = 0;
    for prof in professionals {
        inserted += stmt.execute(params![
            prof.rpps_id,
            prof.title,
            prof.last_name,
            prof.first_name,
            prof.profession_code,
            prof.profession_label,
            prof.specialty_code,
            prof.specialty_label,
            prof.status,
            prof.practice_address,
            prof.postal_code,
            prof.city,
            prof.date_registered,
            prof.date_updated,
            prof.date_import,
            prof.source_url,
            prof.version_extraction,
        ])?;
    }

    Ok(inserted)
}

pub fn get_professional_by_rpps(
    conn: &Connection,
    rpps_id: &str,
) -> Result<Option<Professional>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROFESSIONAL_COLUMNS} FROM referentiel_rpps WHERE rpps_id = ?1"
    ))?;

    let result = stmt.query_row(params![rpps_id], map_professional);
    match result {
        Ok(prof) => Ok(Some(prof)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Full registry scan; the name matcher filters in memory.
pub fn get_all_professionals(conn: &Connection) -> Result<Vec<Professional>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROFESSIONAL_COLUMNS} FROM referentiel_rpps"
    ))?;

    let rows = stmt.query_map([], map_professional)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn count_professionals(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM referentiel_rpps", [], |row| row.get(0))?;
    Ok(count)
}

/// Search indexes are created once after bulk import, not at schema time.
pub fn create_rpps_indexes(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_rpps_id ON referentiel_rpps(rpps_id);
         CREATE INDEX IF NOT EXISTS idx_status ON referentiel_rpps(status);
         CREATE INDEX IF NOT EXISTS idx_profession_code ON referentiel_rpps(profession_code);",
    )?;
    tracing::info!("Registry search indexes created");
    Ok(())
}

fn map_professional(row: &rusqlite::Row<'_>) -> rusqlite::Result<Professional> {
    Ok(Professional {
        rpps_id: row.get(0)?,
        title: row.get(1)?,
        last_name: row.get(2)?,
        first_name: row.get(3)?,
        profession_code: row.get(4)?,
        profession_label: row.get(5)?,
        specialty_code: row.get(6)?,
        specialty_label: row.get(7)?,
        status: row.get(8)?,
        practice_address: row.get(9)?,
        postal_code: row.get(10)?,
        city: row.get(11)?,
        date_registered: row.get(12)?,
        date_updated: row.get(13)?,
        date_import: row.get(14)?,
        source_url: row.get(15)?,
        version_extraction: row.get(16)?,
    })
}
