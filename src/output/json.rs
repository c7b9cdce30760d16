//! JSON export of a batch report
//!
//! The export mirrors the report: run metadata plus one object per outcome
//! with its records nested inside. Failed outcomes are included with their
//! error so the file accounts for every completed target.

use crate::model::{BatchReport, Record, TargetOutcome};
use crate::output::OutputResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
struct ReportExport<'a> {
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    total_targets: usize,
    success_count: usize,
    failure_count: usize,
    incomplete: bool,
    outcomes: Vec<OutcomeExport<'a>>,
}

#[derive(Debug, Serialize)]
struct OutcomeExport<'a> {
    index: usize,
    source: &'a str,
    url: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    page_title: Option<&'a str>,
    scraped_at: DateTime<Utc>,
    records: Vec<RecordExport<'a>>,
}

#[derive(Debug, Serialize)]
struct RecordExport<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    title: &'a str,
    url: Option<&'a str>,
}

impl<'a> From<&'a Record> for RecordExport<'a> {
    fn from(record: &'a Record) -> Self {
        Self {
            record_type: record.record_type.as_str(),
            title: &record.title,
            url: record.url.as_deref(),
        }
    }
}

impl<'a> From<&'a TargetOutcome> for OutcomeExport<'a> {
    fn from(outcome: &'a TargetOutcome) -> Self {
        Self {
            index: outcome.index,
            source: &outcome.target.name,
            url: outcome.target.url.as_str(),
            status: outcome.status.to_db_string(),
            error: outcome.status.error_message(),
            page_title: outcome.page_title.as_deref(),
            scraped_at: outcome.completed_at,
            records: outcome.records.iter().map(RecordExport::from).collect(),
        }
    }
}

/// Formats a batch report as pretty-printed JSON
pub fn format_json(report: &BatchReport) -> OutputResult<String> {
    let export = ReportExport {
        started_at: report.started_at,
        finished_at: report.finished_at,
        total_targets: report.total_targets,
        success_count: report.success_count(),
        failure_count: report.failure_count(),
        incomplete: report.incomplete,
        outcomes: report.outcomes.iter().map(OutcomeExport::from).collect(),
    };

    Ok(serde_json::to_string_pretty(&export)?)
}

/// Writes a batch report as JSON
///
/// # Arguments
///
/// * `report` - The batch report
/// * `output_path` - Path where the JSON file should be written
pub fn write_json(report: &BatchReport, output_path: &Path) -> OutputResult<()> {
    let json = format_json(report)?;

    let mut writer = BufWriter::new(File::create(output_path)?);
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}
