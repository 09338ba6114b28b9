//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of the latest
//! crawl cycle: run metadata, batch coverage and store coverage.

use super::{CoverageReport, CycleSummary};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary of a cycle to `output_path`
pub fn generate_markdown_summary(summary: &CycleSummary, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

fn push_coverage_table(md: &mut String, report: &CoverageReport) {
    md.push_str(&format!("Records: {}\n\n", report.total_records));
    md.push_str("| Field | Coverage |\n");
    md.push_str("|-------|----------|\n");
    for field in &report.fields {
        md.push_str(&format!("| {} | {}% |\n", field.field, field.percent));
    }
    md.push('\n');
}

/// Formats a cycle summary as markdown
pub fn format_markdown_summary(summary: &CycleSummary) -> String {
    let mut md = String::new();

    md.push_str("# Catalog Harvest Cycle Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Run ID**: {}\n", summary.run_id));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    if let Some(duration) = summary.duration_seconds {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Status**: {}\n", summary.status));
    md.push_str(&format!("- **Config Hash**: {}\n", summary.config_hash));
    if let Some(error) = &summary.error_message {
        md.push_str(&format!("- **Error**: {}\n", error));
    }
    md.push('\n');

    if let Some(report) = &summary.crawl_report {
        md.push_str("## Crawl Batch Coverage\n\n");
        push_coverage_table(&mut md, report);

        let gaps = report.gaps();
        if !gaps.is_empty() {
            md.push_str("### Weakest Fields\n\n");
            for field in gaps.iter().take(5) {
                md.push_str(&format!("- {} ({}%)\n", field.field, field.percent));
            }
            md.push('\n');
        }
    }

    md.push_str("## Store Coverage\n\n");
    push_coverage_table(&mut md, &summary.database_report);

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::FieldCoverage;

    fn report(percent: u32) -> CoverageReport {
        CoverageReport {
            total_records: 4,
            fields: vec![
                FieldCoverage {
                    field: "price_hr".to_string(),
                    percent,
                },
                FieldCoverage {
                    field: "product_id".to_string(),
                    percent: 100,
                },
            ],
        }
    }

    fn create_test_summary() -> CycleSummary {
        CycleSummary {
            run_id: 3,
            started_at: "2026-01-01T00:00:00Z".to_string(),
            finished_at: Some("2026-01-01T01:00:00Z".to_string()),
            duration_seconds: Some(3600),
            status: "completed".to_string(),
            config_hash: "abc123".to_string(),
            error_message: None,
            crawl_report: Some(report(75)),
            database_report: report(50),
        }
    }

    #[test]
    fn test_format_markdown_summary() {
        let markdown = format_markdown_summary(&create_test_summary());

        assert!(markdown.contains("# Catalog Harvest Cycle Summary"));
        assert!(markdown.contains("- **Run ID**: 3"));
        assert!(markdown.contains("60.00 minutes"));
        assert!(markdown.contains("| price_hr | 75% |"));
        assert!(markdown.contains("| price_hr | 50% |"));
        assert!(markdown.contains("- price_hr (75%)"));
    }

    #[test]
    fn test_failed_run_has_no_batch_section() {
        let mut summary = create_test_summary();
        summary.status = "failed".to_string();
        summary.crawl_report = None;
        summary.error_message = Some("menu unreachable".to_string());

        let markdown = format_markdown_summary(&summary);

        assert!(!markdown.contains("Crawl Batch Coverage"));
        assert!(markdown.contains("- **Error**: menu unreachable"));
        assert!(markdown.contains("## Store Coverage"));
    }

    #[test]
    fn test_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");

        generate_markdown_summary(&create_test_summary(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Catalog Harvest Cycle Summary"));
    }
}
