use std::path::Path;

use rusqlite::Connection;
use tracing;

use super::DatabaseError;

const STORE_MIGRATIONS: &[(i64, &str)] = &[(
    1,
    include_str!("../../resources/migrations/store/001_initial.sql"),
)];

const REGISTRY_MIGRATIONS: &[(i64, &str)] = &[(
    1,
    include_str!("../../resources/migrations/registry/001_initial.sql"),
)];

/// Open the compliance store at the given path and run migrations
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_store_migrations(&conn)?;
    Ok(conn)
}

/// Open an in-memory compliance store (for testing)
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_store_migrations(&conn)?;
    Ok(conn)
}

/// Open the RPPS registry database at the given path and run migrations
pub fn open_registry(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_registry_migrations(&conn)?;
    Ok(conn)
}

/// Open an in-memory registry database (for testing)
pub fn open_memory_registry() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_registry_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run all pending compliance-store migrations
pub fn run_store_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    run_migrations(conn, STORE_MIGRATIONS)
}

/// Run all pending registry migrations
pub fn run_registry_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    run_migrations(conn, REGISTRY_MIGRATIONS)
}

fn run_migrations(conn: &Connection, migrations: &[(i64, &str)]) -> Result<(), DatabaseError> {
    let current_version = get_current_version(conn);

    for &(version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql)
                .map_err(|e| DatabaseError::MigrationFailed {
                    version,
                    reason: e.to_string(),
                })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, i64>(0)
    })
    .unwrap_or(0)
}

/// Count tables in the database (for verification)
pub fn count_tables(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}
