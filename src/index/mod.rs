//! Index module for handing extracted pages to a document index
//!
//! This module defines the boundary between the crawl engine and whatever
//! indexes the extracted content:
//! - The `Indexer` trait the workers call once per page
//! - The `Document` passed across that boundary
//! - A SQLite-backed document store used by the command-line tool
//! - Run tracking for the crawls that fed the store

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteIndexer;
pub use traits::{DocumentStore, IndexError, IndexResult, Indexer};

/// Metadata attached to every indexed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    /// Page title (empty when the page has no `<title>`)
    pub title: String,

    /// URL the page was fetched from
    pub url: String,
}

/// Extracted page content handed to an indexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Creates a document with `{title, url}` metadata
    pub fn new(text: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: DocumentMetadata {
                title: title.into(),
                url: url.into(),
            },
        }
    }
}

/// Represents a stored document
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub text: String,
    pub indexed_at: String,
    pub run_id: Option<i64>,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub base_url: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub visited: Option<u64>,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
