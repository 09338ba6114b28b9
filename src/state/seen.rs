use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Product identifiers claimed so far in the current run
///
/// Cloning shares the underlying set; every worker task holds a clone.
#[derive(Debug, Clone, Default)]
pub struct SeenIds {
    inner: Arc<Mutex<HashSet<u64>>>,
}

impl SeenIds {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<u64>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically claims `id`; returns false if another task already claimed it
    pub fn claim(&self, id: u64) -> bool {
        self.lock().insert(id)
    }

    /// Gives a claim back so that a later listing of the same product can retry it
    pub fn release(&self, id: u64) {
        self.lock().remove(&id);
    }

    pub fn contains(&self, id: u64) -> bool {
        self.lock().contains(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
