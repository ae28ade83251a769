//! Mutex-guarded collection shared by concurrently running endpoint tasks.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::types::PriceResult;

/// Append-only result sink.
///
/// Results from one endpoint are appended under a single lock acquisition,
/// so matches from the same document stay contiguous and in document order.
/// No ordering holds between endpoints.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    results: Mutex<Vec<PriceResult>>,
}

impl ResultAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, result: PriceResult) {
        self.lock().push(result);
    }

    pub fn append_all(&self, results: impl IntoIterator<Item = PriceResult>) {
        self.lock().extend(results);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Takes every collected result, leaving the aggregator empty.
    ///
    /// Call only once all producing tasks have finished.
    #[must_use]
    pub fn drain(&self) -> Vec<PriceResult> {
        std::mem::take(&mut *self.lock())
    }

    // A panicking producer cannot leave a half-written entry behind: pushes
    // are the only mutation, so a poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, Vec<PriceResult>> {
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
