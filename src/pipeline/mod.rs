//! Reconciliation of a crawl batch against the product store
//!
//! Deduplicates the batch, diffs it against the store, translates only the
//! products the store has never seen, and flattens everything into
//! storage-shaped records with a coverage report.

mod flatten;
mod reconcile;
mod translator;

pub use flatten::flatten_product;
pub use reconcile::{dedup, reconcile, Reconciliation};
pub use translator::{parse_translation_page, MarketTranslator, Translator};
