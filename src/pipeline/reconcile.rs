use super::flatten::flatten_product;
use super::translator::Translator;
use crate::model::{EnrichedProduct, LocalizedDescription, StoredRecord};
use crate::output::CoverageReport;
use crate::storage::{DiffSplit, ProductStore};
use std::collections::HashMap;

/// Output of reconciling one crawl batch
#[derive(Debug)]
pub struct Reconciliation {
    /// `existing ++ new`, flattened for storage
    pub records: Vec<StoredRecord>,
    pub report: CoverageReport,
    pub existing: usize,
    pub new: usize,
    /// The store could not be diffed and the whole batch was treated as existing
    pub diff_degraded: bool,
}

/// Collapses products sharing an identifier
///
/// The last occurrence wins and takes the position of the first.
pub fn dedup(batch: Vec<EnrichedProduct>) -> Vec<EnrichedProduct> {
    let mut index: HashMap<u64, usize> = HashMap::with_capacity(batch.len());
    let mut unique: Vec<EnrichedProduct> = Vec::with_capacity(batch.len());

    for product in batch {
        match index.get(&product.product_id).copied() {
            Some(slot) => unique[slot] = product,
            None => {
                index.insert(product.product_id, unique.len());
                unique.push(product);
            }
        }
    }

    unique
}

/// Translates one product into every locale
///
/// A locale that fails is filled with empty strings.
async fn translate_product(
    translator: &dyn Translator,
    product: &mut EnrichedProduct,
    locales: &[String],
) {
    for locale in locales {
        let text = match translator.translate(product.product_id, locale).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(product_id = product.product_id, locale = %locale, error = %e, "Translation failed");
                LocalizedDescription::default()
            }
        };
        product.translations.insert(locale.clone(), text);
    }
}

/// Reconciles a crawl batch against the store
///
/// Only products the store does not know yet are translated. If the store
/// cannot be diffed, nothing is translated.
pub async fn reconcile(
    batch: Vec<EnrichedProduct>,
    store: &dyn ProductStore,
    translator: &dyn Translator,
    locales: &[String],
) -> Reconciliation {
    let batch = dedup(batch);
    let total = batch.len();

    let (split, diff_degraded) = match store.diff(batch.clone()) {
        Ok(split) => (split, false),
        Err(e) => {
            tracing::warn!(error = %e, products = total, "Store diff failed, treating batch as existing");
            (
                DiffSplit {
                    existing: batch,
                    new: Vec::new(),
                },
                true,
            )
        }
    };

    let DiffSplit { existing, mut new } = split;
    tracing::info!(existing = existing.len(), new = new.len(), "Batch diffed against store");

    for product in &mut new {
        translate_product(translator, product, locales).await;
    }

    let records: Vec<StoredRecord> = existing.iter().chain(new.iter()).map(flatten_product).collect();
    let report = CoverageReport::compute(&records, locales);

    Reconciliation {
        records,
        report,
        existing: existing.len(),
        new: new.len(),
        diff_degraded,
    }
}
