//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the lexcrawl document store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    total_items INTEGER,
    fetched_items INTEGER,
    failed_pages INTEGER,
    skipped_documents INTEGER,
    status TEXT NOT NULL
);

-- One row per document, latest crawl wins
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY,
    code TEXT NOT NULL,
    subject TEXT NOT NULL,
    law_type TEXT NOT NULL,
    published_date TEXT,
    record TEXT NOT NULL,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    stored_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_code ON documents(code);
CREATE INDEX IF NOT EXISTS idx_documents_run ON documents(run_id);
"#;

/// Initializes the database schema
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
