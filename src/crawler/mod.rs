//! Crawler module for site-scoped concurrent crawling
//!
//! This module contains the crawl engine, including:
//! - HTTP fetching (one GET per page, no retries)
//! - HTML noise stripping, content extraction and link collection
//! - The frontier: FIFO queue, seen set and outstanding-work counter
//! - The worker pool and the single-flight crawl controller

mod controller;
mod fetcher;
mod frontier;
mod parser;
mod session;
mod worker;

pub use controller::{Controller, CrawlRequest, DEFAULT_WORKER_POOL_SIZE};
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use frontier::{Frontier, Job};
pub use parser::{to_text, ContentExtractor, ExtractedPage, PageModel};
pub use session::{CrawlReport, CrawlSession};
pub use worker::{PageProcessor, PageVisit, StateHandle, Worker};
