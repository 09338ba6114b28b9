//! Enrichment fan-out
//!
//! Listings of one subcategory are enriched either one at a time or through a
//! bounded pool of tokio tasks. Both paths feed the same `Accumulator` and
//! stop dispatching as soon as the cancel flag is raised. When the pool is
//! cancelled, outstanding tasks are aborted instead of awaited.

use super::accumulator::{Accumulator, Offer};
use crate::enrich::{CategoryContext, Enricher};
use crate::model::RawListing;
use crate::state::CancelFlag;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Per-subcategory counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOutStats {
    pub enriched: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub discarded: usize,
    pub abandoned: usize,
}

impl FanOutStats {
    fn record(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Stored => self.enriched += 1,
            TaskOutcome::Duplicate => self.duplicates += 1,
            TaskOutcome::Failed => self.failed += 1,
            TaskOutcome::Discarded => self.discarded += 1,
        }
    }

    pub fn merge(&mut self, other: &FanOutStats) {
        self.enriched += other.enriched;
        self.duplicates += other.duplicates;
        self.failed += other.failed;
        self.discarded += other.discarded;
        self.abandoned += other.abandoned;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskOutcome {
    Stored,
    Duplicate,
    Failed,
    /// Enriched after the cap was reached, or skipped because of it
    Discarded,
}

async fn enrich_one(
    enricher: &Enricher,
    accumulator: &Accumulator,
    cancel: &CancelFlag,
    listing: &RawListing,
    context: &CategoryContext,
) -> TaskOutcome {
    if cancel.is_cancelled() {
        return TaskOutcome::Discarded;
    }

    match enricher.enrich(listing, context).await {
        Ok(Some(product)) => {
            let product_id = product.product_id;
            match accumulator.offer(product) {
                Offer::Accepted | Offer::Replaced => TaskOutcome::Stored,
                Offer::Filled => {
                    tracing::info!(product_id, "Product cap reached");
                    TaskOutcome::Stored
                }
                Offer::Rejected => TaskOutcome::Discarded,
            }
        }
        Ok(None) => TaskOutcome::Duplicate,
        // The enricher has already logged the failure with its context
        Err(_) => TaskOutcome::Failed,
    }
}

/// Enriches listings one after another
pub async fn fan_out_sequential(
    enricher: &Enricher,
    accumulator: &Accumulator,
    cancel: &CancelFlag,
    listings: Vec<RawListing>,
    context: &CategoryContext,
) -> FanOutStats {
    let mut stats = FanOutStats::default();
    let total = listings.len();

    for (done, listing) in listings.iter().enumerate() {
        if cancel.is_cancelled() {
            stats.abandoned += total - done;
            break;
        }
        stats.record(enrich_one(enricher, accumulator, cancel, listing, context).await);
    }

    stats
}

/// Enriches listings on a pool of at most `max_concurrent` tasks
pub async fn fan_out_concurrent(
    enricher: &Enricher,
    accumulator: &Arc<Accumulator>,
    cancel: &CancelFlag,
    listings: Vec<RawListing>,
    context: &CategoryContext,
    max_concurrent: usize,
) -> FanOutStats {
    let mut stats = FanOutStats::default();
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut tasks = JoinSet::new();
    let total = listings.len();

    for (dispatched, listing) in listings.into_iter().enumerate() {
        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };

        if cancel.is_cancelled() {
            stats.abandoned += total - dispatched;
            break;
        }

        let enricher = enricher.clone();
        let accumulator = Arc::clone(accumulator);
        let cancel = cancel.clone();
        let context = context.clone();

        tasks.spawn(async move {
            let _permit = permit;
            enrich_one(&enricher, &accumulator, &cancel, &listing, &context).await
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => stats.record(outcome),
            Err(e) => {
                tracing::warn!(subcategory = %context.subcategory, error = %e, "Enrichment task panicked");
                stats.failed += 1;
            }
        }

        if cancel.is_cancelled() {
            stats.abandoned += tasks.len();
            tasks.abort_all();
            break;
        }
    }

    // Dropping the set aborts anything still running without waiting for it
    drop(tasks);
    stats
}
