//! Output module for coverage reports and cycle summaries
//!
//! This module handles:
//! - Computing per-field coverage over a batch of records
//! - Printing coverage to the console
//! - Generating markdown summaries of the latest crawl cycle

mod coverage;
mod markdown;
pub mod stats;

pub use coverage::{CoverageReport, FieldCoverage};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::print_report;

use crate::storage::{ProductStore, StorageError};
use crate::HarvestError;

/// Summary of one crawl cycle as recorded in the store
#[derive(Debug, Clone, Default)]
pub struct CycleSummary {
    // Run metadata
    pub run_id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub duration_seconds: Option<u64>,
    pub status: String,
    pub config_hash: String,
    pub error_message: Option<String>,

    /// Coverage of the batch the cycle wrote; absent for failed cycles
    pub crawl_report: Option<CoverageReport>,

    /// Coverage of the whole store at summary time
    pub database_report: CoverageReport,
}

/// Generates a summary of the latest cycle from the store
///
/// # Arguments
///
/// * `store` - The product store holding runs and products
/// * `locales` - Translation locales to report on
///
/// # Returns
///
/// * `Ok(CycleSummary)` - Successfully generated summary
/// * `Err(HarvestError)` - No run recorded yet, or the store could not be read
pub fn generate_summary(
    store: &dyn ProductStore,
    locales: &[String],
) -> Result<CycleSummary, HarvestError> {
    let run = store
        .latest_run()?
        .ok_or_else(|| StorageError::Database("No crawl runs found in database".to_string()))?;

    let duration_seconds = match (
        run.started_at.parse::<chrono::DateTime<chrono::Utc>>(),
        run.finished_at
            .as_deref()
            .map(str::parse::<chrono::DateTime<chrono::Utc>>),
    ) {
        (Ok(started), Some(Ok(finished))) => Some((finished - started).num_seconds().max(0) as u64),
        _ => None,
    };

    let crawl_report = run.report.as_deref().and_then(|json| {
        serde_json::from_str::<CoverageReport>(json)
            .map_err(|e| tracing::warn!(run_id = run.id, error = %e, "Stored run report is unreadable"))
            .ok()
    });

    let database_report = CoverageReport::compute(&store.all()?, locales);

    Ok(CycleSummary {
        run_id: run.id,
        started_at: run.started_at,
        finished_at: run.finished_at,
        duration_seconds,
        status: run.status.to_db_string().to_string(),
        config_hash: run.config_hash,
        error_message: run.error_message,
        crawl_report,
        database_report,
    })
}
