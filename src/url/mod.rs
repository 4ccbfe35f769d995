//! URL handling module for Subsite-Crawler
//!
//! This module decides which links on a page belong to the crawl and validates
//! the base URL a crawl is started from.
//!
//! URLs are treated as opaque strings. No normalization is performed: two URLs
//! that differ only by a trailing slash, a query string or the scheme are
//! distinct pages and will both be visited.

mod base;
mod classifier;

// Re-export main functions
pub use base::validate_base_url;
pub use classifier::{child_urls, current_subsite, is_child};
