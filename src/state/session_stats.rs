use crate::state::PageOutcome;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for one crawl session
///
/// Workers update these concurrently; the controller reads them once all
/// workers have been joined.
#[derive(Debug, Default)]
pub struct SessionStats {
    ok: AtomicUsize,
    errors: AtomicUsize,
    exceptions: AtomicUsize,
    indexed: AtomicUsize,
}

impl SessionStats {
    /// Creates a new set of zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one processed page
    pub fn record_outcome(&self, outcome: &PageOutcome) {
        let counter = match outcome {
            PageOutcome::Ok => &self.ok,
            PageOutcome::Error(_) => &self.errors,
            PageOutcome::Except(_) => &self.exceptions,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Records that a page was handed to the indexer
    pub fn record_indexed(&self) {
        self.indexed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ok(&self) -> usize {
        self.ok.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn exceptions(&self) -> usize {
        self.exceptions.load(Ordering::Relaxed)
    }

    pub fn indexed(&self) -> usize {
        self.indexed.load(Ordering::Relaxed)
    }

    /// Total number of pages processed, whatever the outcome
    pub fn processed(&self) -> usize {
        self.ok() + self.errors() + self.exceptions()
    }
}
