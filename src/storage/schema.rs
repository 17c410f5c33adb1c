//! Database schema definitions
//!
//! The link log is a single append-only table. Rows are never updated or
//! deleted by the crawler.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Every matching link, once per occurrence
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    submission_title TEXT,
    submission_date TEXT
);
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
