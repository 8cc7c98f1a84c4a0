use rusqlite::Connection;

use crate::db::DatabaseError;
use crate::models::ImportDocument;

pub fn insert_import_document(
    conn: &Connection,
    doc: &ImportDocument,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO import_documents (file_name, file_size_mb, sha256, import_date)
         VALUES (?1, ?2, ?3, ?4)",
        (
            &doc.file_name,
            doc.file_size_mb,
            &doc.sha256,
            doc.import_date.to_string(),
        ),
    )?;
    Ok(())
}

pub fn get_import_documents(conn: &Connection) -> Result<Vec<ImportDocument>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT file_name, file_size_mb, sha256, import_date
         FROM import_documents ORDER BY id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(ImportDocument {
            file_name: row.get(0)?,
            file_size_mb: row.get(1)?,
            sha256: row.get(2)?,
            import_date: row.get(3)?,
        })
    })?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)
}
