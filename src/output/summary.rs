//! Batch summaries
//!
//! `summarize` reduces a [`BatchReport`] to counts that a person can read at
//! a glance. It never fails and never touches I/O.

use crate::model::{BatchReport, RecordType};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Per-target line of a summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetBreakdown {
    pub index: usize,
    pub name: String,
    pub url: String,

    /// `succeeded`, `fetch_failed` or `extract_failed`
    pub status: String,

    pub records_by_type: BTreeMap<RecordType, usize>,

    /// Failure reason, `None` on success
    pub error: Option<String>,
}

impl TargetBreakdown {
    pub fn record_count(&self, record_type: RecordType) -> usize {
        self.records_by_type.get(&record_type).copied().unwrap_or(0)
    }
}

/// Aggregate view of one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Number of targets enumerated for the batch
    pub total_targets: usize,

    pub success_count: usize,
    pub failure_count: usize,

    /// Records per type across every outcome
    pub total_records_by_type: BTreeMap<RecordType, usize>,

    /// One entry per outcome, in enumeration order
    pub per_target_breakdown: Vec<TargetBreakdown>,

    /// The batch was cancelled before every target completed
    pub incomplete: bool,
}

impl Summary {
    /// Total number of records of every type
    pub fn total_records(&self) -> usize {
        self.total_records_by_type.values().sum()
    }

    /// Records of one type
    pub fn records_of(&self, record_type: RecordType) -> usize {
        self.total_records_by_type
            .get(&record_type)
            .copied()
            .unwrap_or(0)
    }

    /// Returns the success rate as a percentage of completed targets
    pub fn success_rate(&self) -> f64 {
        let completed = self.success_count + self.failure_count;
        if completed == 0 {
            return 0.0;
        }
        (self.success_count as f64 / completed as f64) * 100.0
    }

    /// Wall-clock duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Builds a summary from a batch report
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use topic_harvest::{summarize, BatchReport};
///
/// let report = BatchReport {
///     started_at: Utc::now(),
///     finished_at: Utc::now(),
///     total_targets: 0,
///     outcomes: vec![],
///     incomplete: false,
/// };
/// let summary = summarize(&report);
/// assert_eq!(summary.total_records(), 0);
/// ```
pub fn summarize(report: &BatchReport) -> Summary {
    let per_target_breakdown = report
        .outcomes
        .iter()
        .map(|outcome| {
            let mut records_by_type = BTreeMap::new();
            for record in &outcome.records {
                *records_by_type.entry(record.record_type).or_insert(0) += 1;
            }

            TargetBreakdown {
                index: outcome.index,
                name: outcome.target.name.clone(),
                url: outcome.target.url.to_string(),
                status: outcome.status.to_db_string().to_string(),
                records_by_type,
                error: outcome.status.error_message(),
            }
        })
        .collect();

    Summary {
        started_at: report.started_at,
        finished_at: report.finished_at,
        total_targets: report.total_targets,
        success_count: report.success_count(),
        failure_count: report.failure_count(),
        total_records_by_type: report.records_by_type(),
        per_target_breakdown,
        incomplete: report.incomplete,
    }
}

/// Prints a summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The summary to display
pub fn print_summary(summary: &Summary) {
    println!("=== Harvest Summary ===\n");

    println!("Overview:");
    println!("  Targets: {}", summary.total_targets);
    println!("  Succeeded: {}", summary.success_count);
    println!("  Failed: {}", summary.failure_count);
    println!("  Duration: {:.1}s", summary.duration_seconds());
    if summary.incomplete {
        println!(
            "  Incomplete: {} of {} targets did not run",
            summary.total_targets - (summary.success_count + summary.failure_count),
            summary.total_targets
        );
    }
    println!();

    println!("Records by Type:");
    for record_type in [RecordType::Topic, RecordType::Discussion] {
        println!("  {}: {}", record_type, summary.records_of(record_type));
    }
    println!();

    println!("Targets:");
    for target in &summary.per_target_breakdown {
        match &target.error {
            None => println!(
                "  {}: {} topics, {} discussions",
                target.name,
                target.record_count(RecordType::Topic),
                target.record_count(RecordType::Discussion)
            ),
            Some(error) => println!("  {}: {}", target.name, error),
        }
    }
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} targets)",
        summary.success_rate(),
        summary.success_count,
        summary.success_count + summary.failure_count
    );
}
