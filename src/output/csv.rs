//! CSV export of extracted records
//!
//! One row per record under the header
//! `SourceName,RecordType,Title,URL,Timestamp`. Targets without records,
//! failed targets included, produce no rows. Fields are quoted per RFC 4180
//! only when they contain a comma, a quote or a line break.

use crate::model::BatchReport;
use crate::output::OutputResult;
use chrono::SecondsFormat;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Column header row
pub const CSV_HEADER: [&str; 5] = ["SourceName", "RecordType", "Title", "URL", "Timestamp"];

const SEPARATOR: char = ',';

fn needs_quotes(field: &str) -> bool {
    field.contains(SEPARATOR) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Writes a single row, quoting fields as needed
fn write_row<W: Write>(w: &mut W, row: &[&str]) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            write!(w, "{}", SEPARATOR)?;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    write!(w, "\r\n")
}

/// Streams the CSV rendering of a report into any writer
pub fn write_csv_to<W: Write>(report: &BatchReport, mut w: W) -> io::Result<()> {
    write_row(&mut w, &CSV_HEADER)?;

    for outcome in &report.outcomes {
        let timestamp = outcome
            .completed_at
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        for record in &outcome.records {
            write_row(
                &mut w,
                &[
                    outcome.target.name.as_str(),
                    record.record_type.as_str(),
                    record.title.as_str(),
                    record.url.as_deref().unwrap_or(""),
                    timestamp.as_str(),
                ],
            )?;
        }
    }

    w.flush()
}

/// Formats a report as a CSV string
pub fn format_csv(report: &BatchReport) -> String {
    let mut buffer = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_csv_to(report, &mut buffer);
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Writes a report's records as CSV
///
/// # Arguments
///
/// * `report` - The batch report
/// * `output_path` - Path where the CSV file should be written
pub fn write_csv(report: &BatchReport, output_path: &Path) -> OutputResult<()> {
    let file = File::create(output_path)?;
    write_csv_to(report, BufWriter::new(file))?;
    Ok(())
}
