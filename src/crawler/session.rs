//! Per-crawl state shared by the controller and its workers

use crate::crawler::frontier::Frontier;
use crate::state::SessionStats;
use std::time::{Duration, Instant};

/// Everything one crawl owns: its frontier and its counters
///
/// A session is created for each accepted `crawl()` call and dropped once the
/// call returns, so nothing leaks from one crawl into the next.
pub struct CrawlSession {
    base_url: String,
    frontier: Frontier,
    stats: SessionStats,
    started: Instant,
}

impl CrawlSession {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            frontier: Frontier::new(),
            stats: SessionStats::new(),
            started: Instant::now(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Builds the summary of this crawl
    ///
    /// Only meaningful once every worker has been joined.
    pub fn report(&self) -> CrawlReport {
        CrawlReport {
            base_url: self.base_url.clone(),
            visited: self.frontier.seen_count(),
            ok: self.stats.ok(),
            errors: self.stats.errors(),
            exceptions: self.stats.exceptions(),
            indexed: self.stats.indexed(),
            elapsed: self.started.elapsed(),
        }
    }
}

/// Summary returned by a completed crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    /// Root URL the crawl was scoped to
    pub base_url: String,

    /// Distinct URLs visited (seeds included)
    pub visited: usize,

    /// Pages that ended `OK`
    pub ok: usize,

    /// Pages that ended `ERROR` (bad HTTP status)
    pub errors: usize,

    /// Pages that ended `EXCEPT` (any other failure)
    pub exceptions: usize,

    /// Pages handed to the indexer
    pub indexed: usize,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Pages that did not end `OK`
    pub fn failed(&self) -> usize {
        self.errors + self.exceptions
    }
}
