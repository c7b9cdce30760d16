//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the run history database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track batch runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    total_targets INTEGER NOT NULL DEFAULT 0
);

-- One row per completed target
CREATE TABLE IF NOT EXISTS outcomes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    target_index INTEGER NOT NULL,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    status TEXT NOT NULL,
    error_message TEXT,
    page_title TEXT,
    completed_at TEXT NOT NULL,
    UNIQUE(run_id, target_index)
);

CREATE INDEX IF NOT EXISTS idx_outcomes_run ON outcomes(run_id);

-- Extracted records
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    outcome_id INTEGER NOT NULL REFERENCES outcomes(id),
    position INTEGER NOT NULL,
    record_type TEXT NOT NULL,
    title TEXT NOT NULL,
    url TEXT
);

CREATE INDEX IF NOT EXISTS idx_records_outcome ON records(outcome_id);
CREATE INDEX IF NOT EXISTS idx_records_type ON records(record_type);
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
