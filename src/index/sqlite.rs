//! SQLite document store
//!
//! This module provides a SQLite-based implementation of the `Indexer` and
//! `DocumentStore` traits.

use crate::index::schema::initialize_schema;
use crate::index::traits::{DocumentStore, IndexError, IndexResult, Indexer};
use crate::index::{Document, DocumentRecord, RunRecord, RunStatus};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// SQLite-backed document store
///
/// The connection sits behind a mutex so one store can be shared by every
/// worker of a crawl.
pub struct SqliteIndexer {
    conn: Mutex<Connection>,
    current_run: Mutex<Option<i64>>,
}

impl SqliteIndexer {
    /// Opens (or creates) a document store at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteIndexer)` - Successfully opened/created database
    /// * `Err(IndexError)` - Failed to open database
    pub fn new(path: &Path) -> IndexResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self::from_connection(conn))
    }

    /// Creates an in-memory store
    pub fn new_in_memory() -> IndexResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            current_run: Mutex::new(None),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_run(&self) -> Option<i64> {
        *self.current_run.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn finish_run(&self, run_id: i64, status: RunStatus, visited: Option<u64>) -> IndexResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn().execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, visited = ?3 WHERE id = ?4",
            params![status.to_db_string(), now, visited.map(|v| v as i64), run_id],
        )?;
        if updated == 0 {
            return Err(IndexError::RunNotFound(run_id));
        }

        let mut current = self.current_run.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == Some(run_id) {
            *current = None;
        }
        Ok(())
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        base_url: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?).unwrap_or(RunStatus::Failed),
        visited: row.get::<_, Option<i64>>(6)?.map(|v| v as u64),
    })
}

const RUN_COLUMNS: &str = "id, base_url, started_at, finished_at, config_hash, status, visited";

#[async_trait]
impl Indexer for SqliteIndexer {
    async fn index(&self, document: Document) -> IndexResult<()> {
        if document.metadata.url.is_empty() {
            return Err(IndexError::Rejected("document has no URL".to_string()));
        }

        let id = self.upsert_document(&document)?;
        tracing::debug!("Stored document {} for {}", id, document.metadata.url);
        Ok(())
    }
}

impl DocumentStore for SqliteIndexer {
    // ===== Run Management =====

    fn create_run(&self, base_url: &str, config_hash: &str) -> IndexResult<i64> {
        let now = Utc::now().to_rfc3339();
        let run_id = {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO runs (base_url, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
                params![base_url, now, config_hash, RunStatus::Running.to_db_string()],
            )?;
            conn.last_insert_rowid()
        };

        *self.current_run.lock().unwrap_or_else(PoisonError::into_inner) = Some(run_id);
        Ok(run_id)
    }

    fn complete_run(&self, run_id: i64, visited: u64) -> IndexResult<()> {
        self.finish_run(run_id, RunStatus::Completed, Some(visited))
    }

    fn fail_run(&self, run_id: i64) -> IndexResult<()> {
        self.finish_run(run_id, RunStatus::Failed, None)
    }

    fn get_run(&self, run_id: i64) -> IndexResult<RunRecord> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS))?;

        let run = stmt
            .query_row(params![run_id], run_from_row)
            .optional()?
            .ok_or(IndexError::RunNotFound(run_id))?;

        Ok(run)
    }

    fn get_latest_run(&self) -> IndexResult<Option<RunRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM runs ORDER BY id DESC LIMIT 1",
            RUN_COLUMNS
        ))?;

        let run = stmt.query_row([], run_from_row).optional()?;

        Ok(run)
    }

    // ===== Documents =====

    fn upsert_document(&self, document: &Document) -> IndexResult<i64> {
        let now = Utc::now().to_rfc3339();
        let run_id = self.current_run();
        let conn = self.conn();

        let id = conn.query_row(
            "INSERT INTO documents (url, title, text, indexed_at, run_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(url) DO UPDATE SET
                title = excluded.title,
                text = excluded.text,
                indexed_at = excluded.indexed_at,
                run_id = excluded.run_id
             RETURNING id",
            params![
                document.metadata.url,
                document.metadata.title,
                document.text,
                now,
                run_id
            ],
            |row| row.get(0),
        )?;

        Ok(id)
    }

    fn get_document_by_url(&self, url: &str) -> IndexResult<Option<DocumentRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, url, title, text, indexed_at, run_id FROM documents WHERE url = ?1",
        )?;

        let document = stmt
            .query_row(params![url], |row| {
                Ok(DocumentRecord {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    title: row.get(2)?,
                    text: row.get(3)?,
                    indexed_at: row.get(4)?,
                    run_id: row.get(5)?,
                })
            })
            .optional()?;

        Ok(document)
    }

    // ===== Statistics =====

    fn count_documents(&self) -> IndexResult<u64> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_documents_for_run(&self, run_id: i64) -> IndexResult<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM documents WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_runs(&self) -> IndexResult<u64> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
