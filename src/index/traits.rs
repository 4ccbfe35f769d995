//! Indexer traits and error types
//!
//! This module defines the trait the crawl engine calls for every page with
//! content, the trait for stores that keep documents and run history, and
//! their error type.

use crate::index::{Document, DocumentRecord, RunRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during indexing
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Document rejected: {0}")]
    Rejected(String),
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Receives the extracted content of crawled pages
///
/// The crawl engine calls `index` at most once per distinct URL and never for a
/// page whose extracted text is empty. Implementations may batch or defer work
/// internally; the engine awaits each call before moving on to the page's links.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Indexes one page
    async fn index(&self, document: Document) -> IndexResult<()>;
}

/// Persistent store of indexed documents and crawl runs
pub trait DocumentStore {
    // ===== Run Management =====

    /// Creates a new crawl run and makes it the run new documents belong to
    ///
    /// # Arguments
    ///
    /// * `base_url` - Root URL of the crawl
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&self, base_url: &str, config_hash: &str) -> IndexResult<i64>;

    /// Marks a run as completed with its visited-URL count
    fn complete_run(&self, run_id: i64, visited: u64) -> IndexResult<()>;

    /// Marks a run as failed
    fn fail_run(&self, run_id: i64) -> IndexResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> IndexResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> IndexResult<Option<RunRecord>>;

    // ===== Documents =====

    /// Inserts a document, replacing any earlier version with the same URL
    ///
    /// # Returns
    ///
    /// The row ID of the stored document
    fn upsert_document(&self, document: &Document) -> IndexResult<i64>;

    /// Looks up the stored document for a URL
    fn get_document_by_url(&self, url: &str) -> IndexResult<Option<DocumentRecord>>;

    // ===== Statistics =====

    /// Counts all stored documents
    fn count_documents(&self) -> IndexResult<u64>;

    /// Counts documents stored by a run
    fn count_documents_for_run(&self, run_id: i64) -> IndexResult<u64>;

    /// Counts all recorded runs
    fn count_runs(&self) -> IndexResult<u64>;
}
