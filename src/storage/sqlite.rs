//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::model::{BatchReport, RecordType};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{OutcomeRecord, RunRecord, RunStatus, StoredRecord};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, total_targets";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Failed),
        total_targets: row.get::<_, i64>(5)? as u64,
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str, total_targets: usize) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status, total_targets) VALUES (?1, ?2, ?3, ?4)",
            params![
                now,
                config_hash,
                RunStatus::Running.to_db_string(),
                total_targets as i64
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn count_runs(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Outcomes =====

    fn save_report(&mut self, run_id: i64, report: &BatchReport) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        {
            let mut insert_outcome = tx.prepare(
                "INSERT INTO outcomes
                 (run_id, target_index, name, url, status, error_message, page_title, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            let mut insert_record = tx.prepare(
                "INSERT INTO records (outcome_id, position, record_type, title, url)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;

            for outcome in &report.outcomes {
                let outcome_id = insert_outcome.insert(params![
                    run_id,
                    outcome.index as i64,
                    outcome.target.name,
                    outcome.target.url.as_str(),
                    outcome.status.to_db_string(),
                    outcome.status.error_message(),
                    outcome.page_title,
                    outcome.completed_at.to_rfc3339(),
                ])?;

                for (position, record) in outcome.records.iter().enumerate() {
                    insert_record.execute(params![
                        outcome_id,
                        position as i64,
                        record.record_type.as_str(),
                        record.title,
                        record.url,
                    ])?;
                }
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn get_outcomes(&self, run_id: i64) -> StorageResult<Vec<OutcomeRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT o.id, o.run_id, o.target_index, o.name, o.url, o.status, o.error_message,
             o.page_title, o.completed_at,
             (SELECT COUNT(*) FROM records r WHERE r.outcome_id = o.id)
             FROM outcomes o WHERE o.run_id = ?1 ORDER BY o.target_index",
        )?;

        let outcomes = stmt
            .query_map(params![run_id], |row| {
                Ok(OutcomeRecord {
                    id: row.get(0)?,
                    run_id: row.get(1)?,
                    target_index: row.get::<_, i64>(2)? as u64,
                    name: row.get(3)?,
                    url: row.get(4)?,
                    status: row.get(5)?,
                    error_message: row.get(6)?,
                    page_title: row.get(7)?,
                    completed_at: row.get(8)?,
                    record_count: row.get::<_, i64>(9)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(outcomes)
    }

    fn get_records(&self, outcome_id: i64) -> StorageResult<Vec<StoredRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT outcome_id, record_type, title, url FROM records
             WHERE outcome_id = ?1 ORDER BY position",
        )?;

        let rows = stmt
            .query_map(params![outcome_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(outcome_id, record_type, title, url)| {
                let record_type = RecordType::from_db_string(&record_type).ok_or_else(|| {
                    StorageError::Database(format!("Unknown record type '{}'", record_type))
                })?;
                Ok(StoredRecord {
                    outcome_id,
                    record_type,
                    title,
                    url,
                })
            })
            .collect()
    }

    // ===== Statistics =====

    fn count_records_by_type(&self, run_id: i64) -> StorageResult<BTreeMap<RecordType, u64>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.record_type, COUNT(*) FROM records r
             JOIN outcomes o ON o.id = r.outcome_id
             WHERE o.run_id = ?1 GROUP BY r.record_type",
        )?;

        let mut counts = BTreeMap::new();
        let rows = stmt.query_map(params![run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        for row in rows {
            let (record_type, count) = row?;
            if let Some(record_type) = RecordType::from_db_string(&record_type) {
                counts.insert(record_type, count as u64);
            }
        }

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FetchFailure, Record, Target, TargetOutcome};

    fn create_test_report() -> BatchReport {
        let target = |name: &str| Target::new(&format!("https://example.com/r/{}", name)).unwrap();
        let now = Utc::now();

        BatchReport {
            started_at: now,
            finished_at: now,
            total_targets: 2,
            outcomes: vec![
                TargetOutcome::succeeded(
                    0,
                    target("Python"),
                    Some("r/Python".to_string()),
                    vec![
                        Record::topic("Python packaging"),
                        Record::discussion("Ask anything", "/r/Python/comments/1/"),
                        Record::discussion("Weekly thread", "/r/Python/comments/2/"),
                    ],
                ),
                TargetOutcome::fetch_failed(
                    1,
                    target("coding"),
                    FetchFailure::http(404, "Not Found"),
                ),
            ],
            incomplete: false,
        }
    }

    #[test]
    fn test_create_and_get_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("abc123", 2).unwrap();

        let run = storage.get_run(run_id).unwrap();
        assert_eq!(run.config_hash, "abc123");
        assert_eq!(run.status, RunStatus::Running);
        assert_eq!(run.total_targets, 2);
        assert!(run.finished_at.is_none());
    }

    #[test]
    fn test_get_missing_run() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert!(matches!(
            storage.get_run(42),
            Err(StorageError::RunNotFound(42))
        ));
    }

    #[test]
    fn test_latest_run_and_count() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        assert!(storage.get_latest_run().unwrap().is_none());

        storage.create_run("first", 1).unwrap();
        let second = storage.create_run("second", 1).unwrap();

        let latest = storage.get_latest_run().unwrap().unwrap();
        assert_eq!(latest.id, second);
        assert_eq!(latest.config_hash, "second");
        assert_eq!(storage.count_runs().unwrap(), 2);
    }

    #[test]
    fn test_finish_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("abc", 1).unwrap();

        storage.finish_run(run_id, RunStatus::Interrupted).unwrap();

        let run = storage.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Interrupted);
        assert!(run.finished_at.is_some());

        assert!(storage.finish_run(999, RunStatus::Completed).is_err());
    }

    #[test]
    fn test_save_report_roundtrip() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("abc", 2).unwrap();
        storage.save_report(run_id, &create_test_report()).unwrap();

        let outcomes = storage.get_outcomes(run_id).unwrap();
        assert_eq!(outcomes.len(), 2);

        assert_eq!(outcomes[0].name, "Python");
        assert!(outcomes[0].is_success());
        assert_eq!(outcomes[0].record_count, 3);
        assert_eq!(outcomes[0].page_title.as_deref(), Some("r/Python"));

        assert_eq!(outcomes[1].status, "fetch_failed");
        assert_eq!(
            outcomes[1].error_message.as_deref(),
            Some("HTTP 404: Not Found")
        );
        assert_eq!(outcomes[1].record_count, 0);

        let records = storage.get_records(outcomes[0].id).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].record_type, RecordType::Topic);
        assert_eq!(records[0].url, None);
        assert_eq!(records[2].title, "Weekly thread");
        assert_eq!(records[2].url.as_deref(), Some("/r/Python/comments/2/"));
    }

    #[test]
    fn test_count_records_by_type() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("abc", 2).unwrap();
        storage.save_report(run_id, &create_test_report()).unwrap();

        let counts = storage.count_records_by_type(run_id).unwrap();
        assert_eq!(counts.get(&RecordType::Topic), Some(&1));
        assert_eq!(counts.get(&RecordType::Discussion), Some(&2));

        let other_run = storage.create_run("abc", 0).unwrap();
        assert!(storage.count_records_by_type(other_run).unwrap().is_empty());
    }

    #[test]
    fn test_file_backed_storage_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");

        let run_id = {
            let mut storage = SqliteStorage::new(&path).unwrap();
            let run_id = storage.create_run("abc", 2).unwrap();
            storage.save_report(run_id, &create_test_report()).unwrap();
            storage.finish_run(run_id, RunStatus::Completed).unwrap();
            run_id
        };

        let storage = SqliteStorage::new(&path).unwrap();
        let run = storage.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(storage.get_outcomes(run_id).unwrap().len(), 2);
    }
}
