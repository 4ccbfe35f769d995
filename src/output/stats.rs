//! Statistics generation from the document store
//!
//! This module provides functionality for extracting and displaying
//! statistics about indexed documents and the crawl runs that produced them.

use crate::index::{DocumentStore, IndexError, RunRecord};
use chrono::{DateTime, Utc};

/// Document store statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Total number of documents in the store
    pub total_documents: u64,

    /// Total number of crawl runs recorded
    pub total_runs: u64,

    /// The most recent run, if any
    pub latest_run: Option<RunRecord>,

    /// Documents last written by the most recent run
    pub latest_run_documents: u64,

    /// Duration of the most recent run, if it finished
    pub latest_run_duration_seconds: Option<i64>,
}

/// Loads statistics from a document store
///
/// # Arguments
///
/// * `store` - The document store to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(IndexError)` - Failed to query the store
pub fn load_statistics(store: &dyn DocumentStore) -> Result<CrawlStatistics, IndexError> {
    let total_documents = store.count_documents()?;
    let total_runs = store.count_runs()?;
    let latest_run = store.get_latest_run()?;

    let latest_run_documents = match &latest_run {
        Some(run) => store.count_documents_for_run(run.id)?,
        None => 0,
    };
    let latest_run_duration_seconds = latest_run.as_ref().and_then(run_duration_seconds);

    Ok(CrawlStatistics {
        total_documents,
        total_runs,
        latest_run,
        latest_run_documents,
        latest_run_duration_seconds,
    })
}

/// Seconds between a run's start and finish timestamps
///
/// Returns `None` for unfinished runs or unparsable timestamps.
pub fn run_duration_seconds(run: &RunRecord) -> Option<i64> {
    let started = run.started_at.parse::<DateTime<Utc>>().ok()?;
    let finished = run.finished_at.as_ref()?.parse::<DateTime<Utc>>().ok()?;
    Some((finished - started).num_seconds())
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Index Statistics ===\n");

    println!("Overview:");
    println!("  Documents indexed: {}", stats.total_documents);
    println!("  Crawl runs: {}", stats.total_runs);
    println!();

    let run = match &stats.latest_run {
        Some(run) => run,
        None => {
            println!("No crawl runs recorded yet");
            return;
        }
    };

    println!("Latest Run (#{}):", run.id);
    println!("  Base URL: {}", run.base_url);
    println!("  Status: {}", run.status.to_db_string());
    println!("  Started: {}", run.started_at);
    if let Some(finished) = &run.finished_at {
        println!("  Finished: {}", finished);
    }
    if let Some(seconds) = stats.latest_run_duration_seconds {
        println!("  Duration: {}s", seconds);
    }
    if let Some(visited) = run.visited {
        println!("  URLs visited: {}", visited);
    }
    println!("  Documents written: {}", stats.latest_run_documents);
    println!("  Config hash: {}", run.config_hash);
}
