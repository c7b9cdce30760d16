//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a batch,
//! including run information, record totals and a per-target table.

use crate::model::RecordType;
use crate::output::summary::Summary;
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of a batch
///
/// # Arguments
///
/// * `summary` - The batch summary
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &Summary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a batch summary as markdown
pub fn format_markdown_summary(summary: &Summary) -> String {
    let mut md = String::new();

    md.push_str("# Topic Harvest Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", summary.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.1} seconds\n",
        summary.duration_seconds()
    ));
    let status = if summary.incomplete {
        "incomplete (cancelled)"
    } else {
        "completed"
    };
    md.push_str(&format!("- **Status**: {}\n\n", status));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Targets**: {}\n", summary.total_targets));
    md.push_str(&format!("- **Succeeded**: {}\n", summary.success_count));
    md.push_str(&format!("- **Failed**: {}\n", summary.failure_count));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        summary.success_rate()
    ));

    // Record totals
    md.push_str("## Records by Type\n\n");
    md.push_str("| Type | Count |\n");
    md.push_str("|------|-------|\n");
    for record_type in [RecordType::Topic, RecordType::Discussion] {
        md.push_str(&format!(
            "| {} | {} |\n",
            record_type,
            summary.records_of(record_type)
        ));
    }
    md.push_str(&format!("| **Total** | {} |\n\n", summary.total_records()));

    // Per-target table
    if !summary.per_target_breakdown.is_empty() {
        md.push_str("## Targets\n\n");
        md.push_str("| # | Source | Status | Topics | Discussions | Error |\n");
        md.push_str("|---|--------|--------|--------|-------------|-------|\n");

        for target in &summary.per_target_breakdown {
            md.push_str(&format!(
                "| {} | [{}]({}) | {} | {} | {} | {} |\n",
                target.index,
                escape_cell(&target.name),
                target.url,
                target.status,
                target.record_count(RecordType::Topic),
                target.record_count(RecordType::Discussion),
                target.error.as_deref().map(escape_cell).unwrap_or_default()
            ));
        }
        md.push('\n');
    }

    md
}

/// Keeps a value from breaking the table layout
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures::create_test_report;
    use crate::output::summarize;

    #[test]
    fn test_format_markdown_summary() {
        let summary = summarize(&create_test_report());
        let markdown = format_markdown_summary(&summary);

        assert!(markdown.contains("# Topic Harvest Summary"));
        assert!(markdown.contains("Run Information"));
        assert!(markdown.contains("- **Status**: completed"));
        assert!(markdown.contains("| topic | 1 |"));
        assert!(markdown.contains("| discussion | 2 |"));
        assert!(markdown.contains("| **Total** | 3 |"));
    }

    #[test]
    fn test_markdown_target_table() {
        let summary = summarize(&create_test_report());
        let markdown = format_markdown_summary(&summary);

        assert!(markdown.contains(
            "| 0 | [Python](https://www.reddit.com/r/Python) | succeeded | 1 | 2 |  |"
        ));
        assert!(markdown.contains("| fetch_failed | 0 | 0 | HTTP 429: Too Many Requests |"));
    }

    #[test]
    fn test_markdown_incomplete_status() {
        let mut report = create_test_report();
        report.incomplete = true;
        let markdown = format_markdown_summary(&summarize(&report));

        assert!(markdown.contains("incomplete (cancelled)"));
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("a|b"), "a\\|b");
        assert_eq!(escape_cell("line\nbreak"), "line break");
    }

    #[test]
    fn test_generate_markdown_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");

        generate_markdown_summary(&summarize(&create_test_report()), &path).unwrap();
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .starts_with("# Topic Harvest Summary"));
    }
}
