//! Console rendering of coverage reports

use super::CoverageReport;

/// Renders a report as aligned `field: percent` lines
pub fn format_report(title: &str, report: &CoverageReport) -> String {
    let width = report
        .fields
        .iter()
        .map(|f| f.field.len())
        .max()
        .unwrap_or(0);

    let mut out = format!("=== {} ({} records) ===\n", title, report.total_records);
    for field in &report.fields {
        out.push_str(&format!(
            "  {:<width$}  {:>3}%\n",
            field.field,
            field.percent,
            width = width
        ));
    }
    out
}

/// Prints a report to stdout
///
/// # Arguments
///
/// * `title` - Heading line, e.g. "Crawl batch"
/// * `report` - The report to display
pub fn print_report(title: &str, report: &CoverageReport) {
    println!("{}", format_report(title, report));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::FieldCoverage;

    #[test]
    fn test_format_aligns_fields() {
        let report = CoverageReport {
            total_records: 4,
            fields: vec![
                FieldCoverage {
                    field: "price".to_string(),
                    percent: 100,
                },
                FieldCoverage {
                    field: "price_hr".to_string(),
                    percent: 75,
                },
            ],
        };

        let text = format_report("Crawl batch", &report);

        assert!(text.starts_with("=== Crawl batch (4 records) ==="));
        assert!(text.contains("  price     100%"));
        assert!(text.contains("  price_hr   75%"));
    }
}
