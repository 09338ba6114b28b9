use crate::model::EnrichedProduct;
use crate::state::CancelFlag;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Outcome of offering a product to the accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// Stored as a new product
    Accepted,
    /// Replaced an earlier product with the same identifier
    Replaced,
    /// Stored, and the cap is now reached
    Filled,
    /// Dropped because the cap was already reached
    Rejected,
}

#[derive(Debug, Default)]
struct Inner {
    products: Vec<EnrichedProduct>,
    index: HashMap<u64, usize>,
}

/// Run-wide result buffer shared by enrichment workers
///
/// Keeps one product per identifier (the latest offered wins) and enforces
/// the optional global cap. Reaching the cap raises the cancel flag, and a
/// cap of zero raises it immediately.
#[derive(Debug)]
pub struct Accumulator {
    inner: Mutex<Inner>,
    cap: Option<usize>,
    cancel: CancelFlag,
}

impl Accumulator {
    pub fn new(cap: Option<usize>, cancel: CancelFlag) -> Self {
        if cap == Some(0) {
            cancel.cancel();
        }
        Self {
            inner: Mutex::new(Inner::default()),
            cap,
            cancel,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn offer(&self, product: EnrichedProduct) -> Offer {
        let mut inner = self.lock();

        let existing = inner.index.get(&product.product_id).copied();
        if let Some(slot) = existing {
            inner.products[slot] = product;
            return Offer::Replaced;
        }

        if self.cap.is_some_and(|cap| inner.products.len() >= cap) {
            self.cancel.cancel();
            return Offer::Rejected;
        }

        let slot = inner.products.len();
        inner.index.insert(product.product_id, slot);
        inner.products.push(product);

        if self.cap.is_some_and(|cap| inner.products.len() >= cap) {
            self.cancel.cancel();
            Offer::Filled
        } else {
            Offer::Accepted
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().products.len()
    }

    /// Copies the products accepted so far
    pub fn snapshot(&self) -> Vec<EnrichedProduct> {
        self.lock().products.clone()
    }

    /// Consumes the accumulator, returning products in acceptance order
    pub fn into_products(self) -> Vec<EnrichedProduct> {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .products
    }
}
