//! Database schema definitions
//!
//! This module contains the SQL schema for the record store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Every record ever delivered, keyed by its listing identifier
CREATE TABLE IF NOT EXISTS records (
    identifier INTEGER PRIMARY KEY,
    target TEXT NOT NULL,
    title TEXT NOT NULL,
    location TEXT NOT NULL,
    summary TEXT NOT NULL,
    observed_at TEXT NOT NULL,
    score INTEGER NOT NULL DEFAULT 0,
    response_count INTEGER NOT NULL DEFAULT 0,
    view_count INTEGER NOT NULL DEFAULT 0,
    first_seen_at TEXT NOT NULL
);

-- Labels of each record, one row per label in listing order
CREATE TABLE IF NOT EXISTS record_labels (
    identifier INTEGER NOT NULL REFERENCES records(identifier),
    position INTEGER NOT NULL,
    label TEXT NOT NULL,
    PRIMARY KEY (identifier, position)
);

CREATE INDEX IF NOT EXISTS idx_records_target ON records(target);
CREATE INDEX IF NOT EXISTS idx_records_first_seen ON records(first_seen_at);
"#;

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
    Ok(())
}
