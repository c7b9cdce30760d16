//! Output module for batch summaries and exports
//!
//! This module handles:
//! - Summarizing a batch report into counts and a per-target breakdown
//! - Exporting records as JSON and CSV
//! - Generating a markdown summary file
//! - Reporting on the stored run history

mod csv;
mod json;
mod markdown;
mod stats;
mod summary;

pub use self::csv::{format_csv, write_csv, write_csv_to, CSV_HEADER};
pub use json::{format_json, write_json};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{load_statistics, print_statistics, RunStatistics};
pub use summary::{print_summary, summarize, Summary, TargetBreakdown};

use crate::config::OutputConfig;
use crate::model::BatchReport;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Writes every export enabled in the output configuration
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - Paths of the files written, in JSON, CSV, markdown order
/// * `Err(OutputError)` - A file could not be written
pub fn write_reports(report: &BatchReport, config: &OutputConfig) -> OutputResult<Vec<PathBuf>> {
    let mut written = Vec::new();

    if let Some(path) = &config.json_path {
        let path = Path::new(path);
        write_json(report, path)?;
        tracing::info!("Records saved to {}", path.display());
        written.push(path.to_path_buf());
    }

    if let Some(path) = &config.csv_path {
        let path = Path::new(path);
        write_csv(report, path)?;
        tracing::info!("Records saved to {}", path.display());
        written.push(path.to_path_buf());
    }

    if let Some(path) = &config.summary_path {
        let path = Path::new(path);
        generate_markdown_summary(&summarize(report), path)?;
        tracing::info!("Summary written to {}", path.display());
        written.push(path.to_path_buf());
    }

    Ok(written)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::model::{
        BatchReport, ExtractionError, FetchFailure, Record, Target, TargetOutcome,
    };
    use chrono::Utc;

    /// Four targets: records, HTTP failure, zero records, extraction failure
    pub(crate) fn create_test_report() -> BatchReport {
        let target =
            |name: &str| Target::new(&format!("https://www.reddit.com/r/{}", name)).unwrap();
        let now = Utc::now();

        BatchReport {
            started_at: now,
            finished_at: now + chrono::Duration::milliseconds(1500),
            total_targets: 4,
            outcomes: vec![
                TargetOutcome::succeeded(
                    0,
                    target("Python"),
                    Some("Python".to_string()),
                    vec![
                        Record::topic("Python 3.13 released"),
                        Record::discussion("Weekly thread", "/r/Python/comments/1/"),
                        Record::discussion("Show and tell", "/r/Python/comments/2/"),
                    ],
                ),
                TargetOutcome::fetch_failed(
                    1,
                    target("programming"),
                    FetchFailure::http(429, "Too Many Requests"),
                ),
                TargetOutcome::succeeded(2, target("learnpython"), None, vec![]),
                TargetOutcome::extract_failed(
                    3,
                    target("coding"),
                    ExtractionError::parse("invalid utf-8"),
                ),
            ],
            incomplete: false,
        }
    }
}
