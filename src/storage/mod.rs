//! Storage module for persisting run history
//!
//! This module keeps a history of batch runs in SQLite, including:
//! - Run tracking with the hash of the configuration that produced it
//! - One stored outcome per completed target
//! - The records extracted for each outcome

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::model::{BatchReport, RecordType};
use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Stores a finished batch as a new run
///
/// The run is marked `completed`, or `interrupted` when the report is
/// incomplete.
///
/// # Returns
///
/// The ID of the stored run
pub fn record_report(
    storage: &mut dyn Storage,
    config_hash: &str,
    report: &BatchReport,
) -> StorageResult<i64> {
    let run_id = storage.create_run(config_hash, report.total_targets)?;
    storage.save_report(run_id, report)?;

    let status = if report.incomplete {
        RunStatus::Interrupted
    } else {
        RunStatus::Completed
    };
    storage.finish_run(run_id, status)?;

    tracing::info!("Stored run {} ({})", run_id, status.to_db_string());
    Ok(run_id)
}

/// Represents a batch run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub total_targets: u64,
}

/// Status of a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Represents one stored target outcome
#[derive(Debug, Clone)]
pub struct OutcomeRecord {
    pub id: i64,
    pub run_id: i64,
    pub target_index: u64,
    pub name: String,
    pub url: String,
    pub status: String,
    pub error_message: Option<String>,
    pub page_title: Option<String>,
    pub completed_at: String,
    pub record_count: u64,
}

impl OutcomeRecord {
    pub fn is_success(&self) -> bool {
        self.status == "succeeded"
    }
}

/// Represents one stored record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub outcome_id: i64,
    pub record_type: RecordType,
    pub title: String,
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_roundtrip() {
        for status in &[
            RunStatus::Running,
            RunStatus::Completed,
            RunStatus::Interrupted,
            RunStatus::Failed,
        ] {
            let db_str = status.to_db_string();
            let parsed = RunStatus::from_db_string(db_str);
            assert_eq!(Some(*status), parsed);
        }
    }

    #[test]
    fn test_record_report_marks_incomplete_runs() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let now = chrono::Utc::now();
        let report = BatchReport {
            started_at: now,
            finished_at: now,
            total_targets: 3,
            outcomes: vec![],
            incomplete: true,
        };

        let run_id = record_report(&mut storage, "hash", &report).unwrap();
        let run = storage.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Interrupted);
        assert_eq!(run.total_targets, 3);
    }

    #[test]
    fn test_run_status_invalid() {
        assert_eq!(RunStatus::from_db_string("invalid"), None);
    }
}
