//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::model::{BatchReport, RecordType};
use crate::storage::{OutcomeRecord, RunRecord, RunStatus, StoredRecord};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines every database operation the run history needs.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    /// * `total_targets` - Number of targets enumerated for the run
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str, total_targets: usize) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Number of stored runs
    fn count_runs(&self) -> StorageResult<u64>;

    /// Sets the final status of a run with a finish timestamp
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    // ===== Outcomes =====

    /// Stores every outcome of a report, with its records, in one transaction
    fn save_report(&mut self, run_id: i64, report: &BatchReport) -> StorageResult<()>;

    /// Gets the outcomes of a run in target order
    fn get_outcomes(&self, run_id: i64) -> StorageResult<Vec<OutcomeRecord>>;

    /// Gets the records of one stored outcome in document order
    fn get_records(&self, outcome_id: i64) -> StorageResult<Vec<StoredRecord>>;

    // ===== Statistics =====

    /// Record counts per type for a run
    fn count_records_by_type(&self, run_id: i64) -> StorageResult<BTreeMap<RecordType, u64>>;
}
