//! Subsite-Crawler: a site-scoped crawler that feeds a document index
//!
//! Given a root URL, the crawler visits every reachable page below that root,
//! extracts the main content of each page and hands it to an [`index::Indexer`]
//! exactly once per page.

pub mod config;
pub mod crawler;
pub mod index;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Subsite-Crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("an existing crawl is in progress ({base_url})")]
    Busy { base_url: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("GET failed with status {status_code}")]
    HttpStatus { url: String, status_code: u16 },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Extraction error for {url}: {message}")]
    Extraction { url: String, message: String },

    #[error("Index error: {0}")]
    Index(#[from] index::IndexError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrawlError {
    /// Returns true for errors raised by a misbehaving caller rather than a page
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Busy { .. } | Self::InvalidArgument(_) | Self::Config(_) | Self::UrlError(_)
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("URL cannot be empty")]
    Empty,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),
}

/// Result type alias for Subsite-Crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Controller, CrawlReport, CrawlRequest};
pub use index::{Document, DocumentMetadata, Indexer};
pub use state::{PageOutcome, WorkerState};
pub use crate::url::{child_urls, is_child, validate_base_url};
