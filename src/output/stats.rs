//! Statistics from the stored run history
//!
//! Backs the `--stats` CLI mode: loads the latest run from storage and
//! prints it without re-running anything.

use crate::model::RecordType;
use crate::storage::{OutcomeRecord, RunRecord, Storage, StorageResult};
use std::collections::BTreeMap;

/// Statistics about one stored run
#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub run: RunRecord,

    /// Runs stored in the database, this one included
    pub total_runs: u64,

    pub outcomes: Vec<OutcomeRecord>,

    pub records_by_type: BTreeMap<RecordType, u64>,
}

impl RunStatistics {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }
}

/// Loads statistics for the most recent run
///
/// # Returns
///
/// * `Ok(Some(RunStatistics))` - The latest run
/// * `Ok(None)` - No runs have been stored yet
/// * `Err(StorageError)` - Failed to query storage
pub fn load_statistics(storage: &dyn Storage) -> StorageResult<Option<RunStatistics>> {
    let Some(run) = storage.get_latest_run()? else {
        return Ok(None);
    };

    let outcomes = storage.get_outcomes(run.id)?;
    let records_by_type = storage.count_records_by_type(run.id)?;
    let total_runs = storage.count_runs()?;

    Ok(Some(RunStatistics {
        run,
        total_runs,
        outcomes,
        records_by_type,
    }))
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Run Statistics ===\n");

    println!("Run:");
    println!("  ID: {} (of {} stored)", stats.run.id, stats.total_runs);
    println!("  Started: {}", stats.run.started_at);
    if let Some(finished) = &stats.run.finished_at {
        println!("  Finished: {}", finished);
    }
    println!("  Status: {}", stats.run.status.to_db_string());
    println!("  Config hash: {}", stats.run.config_hash);
    println!();

    println!("Records by Type:");
    for record_type in [RecordType::Topic, RecordType::Discussion] {
        println!(
            "  {}: {}",
            record_type,
            stats.records_by_type.get(&record_type).unwrap_or(&0)
        );
    }
    println!();

    println!("Targets:");
    for outcome in &stats.outcomes {
        match &outcome.error_message {
            None => println!("  {}: {} records", outcome.name, outcome.record_count),
            Some(error) => println!("  {}: {}", outcome.name, error),
        }
    }
    println!();

    println!(
        "Completed {} of {} targets ({} succeeded, {} failed)",
        stats.outcomes.len(),
        stats.run.total_targets,
        stats.success_count(),
        stats.failure_count()
    );
}
