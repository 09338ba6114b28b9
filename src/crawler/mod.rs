//! Category walk and enrichment fan-out
//!
//! This module contains the crawl orchestration, including:
//! - Walking the category tree in listing order
//! - Fanning enrichment out sequentially or over a bounded task pool
//! - Accumulating one product per identifier under an optional cap

mod accumulator;
mod coordinator;
mod pool;

pub use accumulator::{Accumulator, Offer};
pub use coordinator::{Coordinator, CrawlOutcome, CrawlSettings, CrawlStats};
pub use pool::{fan_out_concurrent, fan_out_sequential, FanOutStats};

use crate::config::Config;
use crate::enrich::EnrichSettings;
use crate::source::CatalogSource;
use crate::HarvestError;
use std::sync::Arc;

/// Runs one category walk against `source` with settings taken from `config`
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `source` - Where categories, listings and pages come from
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - The accumulated batch and how the walk ended
/// * `Err(HarvestError)` - The category tree could not be obtained
pub async fn crawl(
    config: &Config,
    source: Arc<dyn CatalogSource>,
) -> Result<CrawlOutcome, HarvestError> {
    Coordinator::new(
        source,
        EnrichSettings::from_config(config),
        CrawlSettings::from_config(&config.crawler),
    )
    .run()
    .await
}
