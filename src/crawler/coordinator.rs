//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the category walk that coordinates the crawl:
//! - Fetching the category tree (the only fatal step)
//! - Walking categories and subcategories in listing order
//! - Skipping excluded subcategories and subcategories whose listing fails
//! - Fanning enrichment out per subcategory
//! - Stopping early once the product cap is reached

use super::accumulator::Accumulator;
use super::pool::{fan_out_concurrent, fan_out_sequential, FanOutStats};
use crate::config::CrawlerConfig;
use crate::enrich::{CategoryContext, EnrichSettings, Enricher};
use crate::model::EnrichedProduct;
use crate::source::CatalogSource;
use crate::state::{CancelFlag, CrawlPhase, SeenIds};
use crate::HarvestError;
use std::sync::Arc;
use std::time::Instant;

/// Orchestration knobs
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub concurrent: bool,
    pub max_concurrent: usize,
    pub max_products: Option<usize>,
    pub excluded_subcategories: Vec<String>,
}

impl CrawlSettings {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            concurrent: config.concurrent,
            max_concurrent: config.max_concurrent_enrichments as usize,
            max_products: config.max_products,
            excluded_subcategories: config.excluded_subcategories.clone(),
        }
    }
}

/// Counters for a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub categories: usize,
    pub subcategories_walked: usize,
    pub subcategories_excluded: usize,
    pub subcategories_failed: usize,
    pub listings: usize,
    pub products: FanOutStats,
}

/// Result of a crawl: the accumulated batch and how the run ended
#[derive(Debug)]
pub struct CrawlOutcome {
    pub products: Vec<EnrichedProduct>,
    pub phase: CrawlPhase,
    pub stats: CrawlStats,
}

impl CrawlOutcome {
    pub fn was_capped(&self) -> bool {
        self.phase == CrawlPhase::Capped
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    source: Arc<dyn CatalogSource>,
    enricher: Enricher,
    settings: CrawlSettings,
    cancel: CancelFlag,
    phase: CrawlPhase,
}

impl Coordinator {
    /// Creates a coordinator with a fresh seen set and cancel flag
    pub fn new(
        source: Arc<dyn CatalogSource>,
        enrich: EnrichSettings,
        settings: CrawlSettings,
    ) -> Self {
        let enricher = Enricher::new(Arc::clone(&source), SeenIds::new(), enrich);
        Self {
            source,
            enricher,
            settings,
            cancel: CancelFlag::new(),
            phase: CrawlPhase::Idle,
        }
    }

    pub fn phase(&self) -> &CrawlPhase {
        &self.phase
    }

    fn set_phase(&mut self, next: CrawlPhase) {
        if !self.phase.can_transition_to(&next) {
            tracing::warn!(from = %self.phase, to = %next, "Unexpected crawl phase transition");
        }
        match &next {
            CrawlPhase::WalkingCategory { .. } | CrawlPhase::Done | CrawlPhase::Capped => {
                tracing::info!(phase = %next, "Crawl phase")
            }
            _ => tracing::debug!(phase = %next, "Crawl phase"),
        }
        self.phase = next;
    }

    /// Runs the category walk to completion or until the cap is reached
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - The walk finished; individual failures are absorbed
    /// * `Err(HarvestError)` - The category tree could not be obtained
    pub async fn run(mut self) -> Result<CrawlOutcome, HarvestError> {
        let start = Instant::now();
        let tree = self.source.list_categories().await?;

        let accumulator = Arc::new(Accumulator::new(self.settings.max_products, self.cancel.clone()));
        let mut stats = CrawlStats::default();

        'categories: for top in tree.categories() {
            stats.categories += 1;
            self.set_phase(CrawlPhase::WalkingCategory {
                category: top.node.display_name.clone(),
            });

            for sub in &top.subcategories {
                if self.settings.excluded_subcategories.contains(&sub.display_name) {
                    tracing::debug!(subcategory = %sub.display_name, "Excluded subcategory skipped");
                    stats.subcategories_excluded += 1;
                    continue;
                }

                self.set_phase(CrawlPhase::WalkingSubcategory {
                    category: top.node.display_name.clone(),
                    subcategory: sub.display_name.clone(),
                });
                stats.subcategories_walked += 1;

                let listings = match self.source.list_products_in_category(&sub.id).await {
                    Ok(listings) => listings,
                    Err(e) => {
                        tracing::warn!(
                            category = %top.node.display_name,
                            subcategory = %sub.display_name,
                            error = %e,
                            "Listing failed, subcategory skipped"
                        );
                        stats.subcategories_failed += 1;
                        continue;
                    }
                };

                stats.listings += listings.len();
                self.set_phase(CrawlPhase::Fanning {
                    subcategory: sub.display_name.clone(),
                    listings: listings.len(),
                });

                let context = CategoryContext {
                    category: top.node.display_name.clone(),
                    subcategory: sub.display_name.clone(),
                };

                let fan_out = if self.settings.concurrent {
                    fan_out_concurrent(
                        &self.enricher,
                        &accumulator,
                        &self.cancel,
                        listings,
                        &context,
                        self.settings.max_concurrent,
                    )
                    .await
                } else {
                    fan_out_sequential(&self.enricher, &accumulator, &self.cancel, listings, &context)
                        .await
                };
                stats.products.merge(&fan_out);

                tracing::debug!(
                    subcategory = %sub.display_name,
                    enriched = fan_out.enriched,
                    failed = fan_out.failed,
                    total = accumulator.len(),
                    "Subcategory done"
                );

                if self.cancel.is_cancelled() {
                    self.set_phase(CrawlPhase::Capped);
                    break 'categories;
                }
            }
        }

        if !self.phase.is_terminal() {
            self.set_phase(CrawlPhase::Done);
        }

        // Aborted tasks may not have dropped their handle yet
        let products = match Arc::try_unwrap(accumulator) {
            Ok(accumulator) => accumulator.into_products(),
            Err(shared) => shared.snapshot(),
        };

        tracing::info!(
            products = products.len(),
            phase = %self.phase,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Crawl finished"
        );

        Ok(CrawlOutcome {
            products,
            phase: self.phase,
            stats,
        })
    }
}
