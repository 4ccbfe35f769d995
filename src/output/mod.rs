//! Output module for crawl reports and index statistics
//!
//! This module handles:
//! - Printing the report of a finished crawl
//! - Printing statistics loaded from the document store

pub mod stats;

pub use stats::{load_statistics, print_statistics, run_duration_seconds, CrawlStatistics};

use crate::crawler::CrawlReport;

/// Prints the report of a finished crawl to stdout
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");
    println!("Base URL: {}", report.base_url);
    println!("  URLs visited: {}", report.visited);
    println!("  OK: {}", report.ok);
    println!("  ERROR: {}", report.errors);
    println!("  EXCEPT: {}", report.exceptions);
    println!("  Documents indexed: {}", report.indexed);
    println!("  Elapsed: {:.2}s", report.elapsed.as_secs_f64());

    let rate = if report.elapsed.as_secs_f64() > 0.0 {
        report.visited as f64 / report.elapsed.as_secs_f64()
    } else {
        0.0
    };
    println!("  Rate: {:.2} pages/sec", rate);
}
