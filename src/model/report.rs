use crate::model::{RecordType, TargetOutcome};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// All outcomes of a batch, in target enumeration order
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Number of targets enumerated for the batch
    pub total_targets: usize,

    /// One outcome per completed target, sorted by `TargetOutcome::index`
    pub outcomes: Vec<TargetOutcome>,

    /// Set when the batch was cancelled before every target completed
    pub incomplete: bool,
}

impl BatchReport {
    /// Number of targets that succeeded
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of targets that failed to fetch or extract
    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    /// Total records per type across all outcomes
    pub fn records_by_type(&self) -> BTreeMap<RecordType, usize> {
        let mut counts = BTreeMap::new();
        for record in self.outcomes.iter().flat_map(|o| o.records.iter()) {
            *counts.entry(record.record_type).or_insert(0) += 1;
        }
        counts
    }

    /// Total number of records across all outcomes
    pub fn total_records(&self) -> usize {
        self.outcomes.iter().map(|o| o.records.len()).sum()
    }

    /// Indices of targets that did not succeed
    pub fn failed_indices(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| o.index)
            .collect()
    }

    /// Wall-clock duration of the batch
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
