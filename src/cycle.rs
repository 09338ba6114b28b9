//! One crawl cycle, end to end
//!
//! A cycle records a run, walks the catalog, reconciles the batch against
//! the store, writes it, and reports coverage of both the batch and the
//! whole store. Failures with no degradation path end the cycle with an
//! error; the caller is expected to wait out a cooldown and try again.

use crate::config::Config;
use crate::crawler::{crawl, CrawlStats};
use crate::model::StoredRecord;
use crate::output::CoverageReport;
use crate::pipeline::{reconcile, MarketTranslator, Translator};
use crate::source::{CatalogSource, HttpCatalogSource};
use crate::state::CrawlPhase;
use crate::storage::{open_storage, ProductStore};
use crate::HarvestError;
use std::path::Path;
use std::sync::Arc;

/// Everything a finished cycle produced
#[derive(Debug)]
pub struct CycleOutcome {
    pub run_id: i64,
    /// The reconciled batch as written to the store
    pub records: Vec<StoredRecord>,
    pub crawl_report: CoverageReport,
    pub database_report: CoverageReport,
    /// `Done` or `Capped`
    pub phase: CrawlPhase,
    pub stats: CrawlStats,
    pub existing: usize,
    pub new: usize,
    pub written: usize,
    pub diff_degraded: bool,
}

/// Runs one cycle against the configured source, store and translation site
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `config_hash` - Hash recorded with the run
///
/// # Returns
///
/// * `Ok(CycleOutcome)` - The batch was written and reported on
/// * `Err(HarvestError)` - The store could not be opened, the category tree
///   could not be obtained, or the batch could not be written
pub async fn run_cycle(config: &Config, config_hash: &str) -> Result<CycleOutcome, HarvestError> {
    let mut store = open_storage(Path::new(&config.output.database_path))?;
    let source: Arc<dyn CatalogSource> = Arc::new(HttpCatalogSource::new(config)?);
    let translator = MarketTranslator::connect(config).await?;

    run_cycle_with(config, config_hash, source, &mut store, &translator).await
}

/// Runs one cycle against explicit collaborators
pub async fn run_cycle_with(
    config: &Config,
    config_hash: &str,
    source: Arc<dyn CatalogSource>,
    store: &mut dyn ProductStore,
    translator: &dyn Translator,
) -> Result<CycleOutcome, HarvestError> {
    let run_id = store.create_run(config_hash)?;
    tracing::info!(run_id, "Crawl cycle started");

    match execute(config, run_id, source, store, translator).await {
        Ok(outcome) => {
            let report_json = outcome
                .crawl_report
                .to_json()
                .map_err(|e| crate::storage::StorageError::Serialization(e.to_string()))?;
            store.complete_run(run_id, &report_json)?;

            tracing::info!(
                run_id,
                phase = %outcome.phase,
                records = outcome.records.len(),
                new = outcome.new,
                written = outcome.written,
                "Crawl cycle completed"
            );
            Ok(outcome)
        }
        Err(e) => {
            if let Err(mark) = store.fail_run(run_id, &e.to_string()) {
                tracing::warn!(run_id, error = %mark, "Failed to mark run as failed");
            }
            tracing::error!(run_id, error = %e, "Crawl cycle failed");
            Err(e)
        }
    }
}

async fn execute(
    config: &Config,
    run_id: i64,
    source: Arc<dyn CatalogSource>,
    store: &mut dyn ProductStore,
    translator: &dyn Translator,
) -> Result<CycleOutcome, HarvestError> {
    let locales = &config.translation.locales;

    let crawled = crawl(config, source).await?;
    let reconciled = reconcile(crawled.products, &*store, translator, locales).await;

    let written = store.upsert(&reconciled.records)?;

    let database_report = match store.all() {
        Ok(all) => CoverageReport::compute(&all, locales),
        Err(e) => {
            tracing::warn!(run_id, error = %e, "Failed to read store for coverage");
            CoverageReport::default()
        }
    };

    Ok(CycleOutcome {
        run_id,
        records: reconciled.records,
        crawl_report: reconciled.report,
        database_report,
        phase: crawled.phase,
        stats: crawled.stats,
        existing: reconciled.existing,
        new: reconciled.new,
        written,
        diff_degraded: reconciled.diff_degraded,
    })
}
