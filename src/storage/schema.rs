//! Database schema definitions
//!
//! This module contains the SQL schema of the SQLite index store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Last processing time of every URL seen by a crawl
CREATE TABLE IF NOT EXISTS url_last_update (
    url TEXT PRIMARY KEY,
    updated_at TEXT NOT NULL
);
"#;

/// Current schema version, stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: u32 = 1;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}

/// Reads the schema version of an open database
pub fn get_schema_version(conn: &rusqlite::Connection) -> Result<u32, rusqlite::Error> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}
