//! Worker tasks that drain the frontier
//!
//! Each worker loops: dequeue a job, process the page, offer the page's children
//! to the frontier, mark the job complete. A shutdown sentinel ends the loop.
//!
//! Page processing runs in its own spawned task. Whatever happens to a page,
//! including a panic inside the indexer, is turned into a [`PageOutcome`] at the
//! loop boundary and the job is still completed, so one bad page can never
//! stall the crawl.

use crate::crawler::fetcher::{fetch_url, FetchResult};
use crate::crawler::frontier::Job;
use crate::crawler::parser::ContentExtractor;
use crate::crawler::session::CrawlSession;
use crate::index::{Document, Indexer};
use crate::state::{PageOutcome, WorkerState};
use crate::url::child_urls;
use crate::CrawlError;
use reqwest::Client;
use std::any::Any;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};

/// What a successfully processed page produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageVisit {
    /// Child URLs to offer to the frontier
    pub children: Vec<String>,

    /// Whether the page was handed to the indexer
    pub indexed: bool,
}

/// Fetches, extracts, indexes and classifies single pages
///
/// One processor is shared by all workers of a crawl.
pub struct PageProcessor {
    base_url: String,
    client: Client,
    extractor: Arc<ContentExtractor>,
    indexer: Arc<dyn Indexer>,
}

impl PageProcessor {
    pub fn new(
        base_url: impl Into<String>,
        client: Client,
        extractor: Arc<ContentExtractor>,
        indexer: Arc<dyn Indexer>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            client,
            extractor,
            indexer,
        }
    }

    /// Processes one page
    ///
    /// # Steps
    ///
    /// 1. GET the page (any status other than 200 is an error)
    /// 2. Strip noise and extract title, main content and links
    /// 3. Index the content unless it is empty; a page with content but no
    ///    `<title>` fails here
    /// 4. Select the links that are children of the current page
    ///
    /// # Returns
    ///
    /// * `Ok(PageVisit)` - The page was processed; its children are returned
    /// * `Err(CrawlError)` - The page failed; it yields no children
    pub async fn process_page(
        &self,
        url: &str,
        state: &StateHandle,
    ) -> Result<PageVisit, CrawlError> {
        state.set(WorkerState::Fetching);
        let body = match fetch_url(&self.client, url).await {
            FetchResult::Success {
                final_url,
                content_type,
                body,
            } => {
                if final_url != url {
                    tracing::debug!("{} redirected to {}", url, final_url);
                }
                tracing::trace!("{}: {} bytes of {}", url, body.len(), content_type);
                body
            }
            FetchResult::HttpError { status_code } => {
                return Err(CrawlError::HttpStatus {
                    url: url.to_string(),
                    status_code,
                });
            }
            FetchResult::NetworkError { error } => {
                return Err(CrawlError::Network {
                    url: url.to_string(),
                    message: error,
                });
            }
        };

        state.set(WorkerState::Indexing);
        let page = self.extractor.extract(&body);
        let indexed = if page.has_content() {
            let title = page.title.ok_or_else(|| CrawlError::Extraction {
                url: url.to_string(),
                message: "page has no <title> element".to_string(),
            })?;
            self.indexer
                .index(Document::new(page.text, title, url))
                .await?;
            true
        } else {
            tracing::debug!("No main content on {}, not indexing", url);
            false
        };

        state.set(WorkerState::Classifying);
        let children = child_urls(&self.base_url, url, &page.hrefs);
        tracing::trace!("{} of {} links on {} are children", children.len(), page.hrefs.len(), url);

        Ok(PageVisit { children, indexed })
    }
}

/// Publishes a worker's current state
///
/// Shared between the worker loop and the page task it spawns.
#[derive(Clone)]
pub struct StateHandle {
    worker_id: usize,
    state: Arc<watch::Sender<WorkerState>>,
}

impl StateHandle {
    pub fn new(worker_id: usize) -> Self {
        let (state, _) = watch::channel(WorkerState::Idle);
        Self {
            worker_id,
            state: Arc::new(state),
        }
    }

    /// Moves to `to`, logging the transition
    pub fn set(&self, to: WorkerState) {
        let from = self.state.send_replace(to);
        if from == to {
            return;
        }
        if !from.can_transition_to(to) {
            tracing::warn!(
                "Worker {}: unexpected transition {} -> {}",
                self.worker_id,
                from,
                to
            );
        }
        tracing::trace!("Worker {}: {} -> {}", self.worker_id, from, to);
    }
}

/// One member of the worker pool
pub struct Worker {
    id: usize,
    session: Arc<CrawlSession>,
    processor: Arc<PageProcessor>,
    state: StateHandle,
}

impl Worker {
    pub fn new(id: usize, session: Arc<CrawlSession>, processor: Arc<PageProcessor>) -> Self {
        Self {
            id,
            session,
            processor,
            state: StateHandle::new(id),
        }
    }

    /// Runs until a shutdown sentinel is received
    ///
    /// # Returns
    ///
    /// The number of pages this worker processed
    pub async fn run(self) -> usize {
        let mut processed = 0;

        loop {
            match self.session.frontier().dequeue().await {
                Job::Shutdown => {
                    self.state.set(WorkerState::Stopped);
                    break;
                }
                Job::Visit(url) => {
                    self.visit(url).await;
                    processed += 1;
                }
            }
        }

        tracing::debug!("Worker {} stopped after {} pages", self.id, processed);
        processed
    }

    /// Processes one URL and always completes it
    async fn visit(&self, url: String) {
        let processor = self.processor.clone();
        let state = self.state.clone();
        let page_url = url.clone();
        // Owned by this future so an aborted worker takes its page down with it
        let mut page_task = JoinSet::new();
        page_task.spawn(async move { processor.process_page(&page_url, &state).await });

        let (outcome, visit) = match page_task.join_next().await {
            Some(Ok(Ok(visit))) => (PageOutcome::Ok, visit),
            Some(Ok(Err(e))) => (PageOutcome::from_error(&e), PageVisit::default()),
            Some(Err(e)) => (PageOutcome::Except(join_error_message(e)), PageVisit::default()),
            None => (
                PageOutcome::Except("page task missing".to_string()),
                PageVisit::default(),
            ),
        };

        log_outcome(&url, &outcome);

        if outcome.is_ok() {
            self.state.set(WorkerState::Enqueueing);
            let offered = visit.children.len();
            let accepted = visit
                .children
                .into_iter()
                .filter(|child| self.session.frontier().offer(child.as_str()))
                .count();
            tracing::trace!("{}: {} new of {} children", url, accepted, offered);
        }

        let stats = self.session.stats();
        stats.record_outcome(&outcome);
        if visit.indexed {
            stats.record_indexed();
        }

        self.session.frontier().complete();
        self.state.set(WorkerState::Idle);
    }
}

/// Writes the per-page log line
fn log_outcome(url: &str, outcome: &PageOutcome) {
    match outcome {
        PageOutcome::Ok => tracing::info!("[OK] url: {}", url),
        PageOutcome::Error(reason) => tracing::warn!("[ERROR] url: {} err: {}", url, reason),
        PageOutcome::Except(reason) => tracing::error!("[EXCEPT] url: {} err: {}", url, reason),
    }
}

fn join_error_message(error: JoinError) -> String {
    if error.is_panic() {
        format!("page task panicked: {}", panic_message(error.into_panic()))
    } else {
        error.to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExtractorConfig, HttpConfig};
    use crate::crawler::fetcher::build_http_client;
    use crate::index::IndexResult;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct RecordingIndexer {
        documents: Mutex<Vec<Document>>,
    }

    #[async_trait]
    impl Indexer for RecordingIndexer {
        async fn index(&self, document: Document) -> IndexResult<()> {
            self.documents.lock().unwrap().push(document);
            Ok(())
        }
    }

    struct PanickingIndexer;

    #[async_trait]
    impl Indexer for PanickingIndexer {
        async fn index(&self, _document: Document) -> IndexResult<()> {
            panic!("indexer blew up");
        }
    }

    fn processor(base_url: &str, indexer: Arc<dyn Indexer>) -> Arc<PageProcessor> {
        Arc::new(PageProcessor::new(
            base_url,
            build_http_client(&HttpConfig::default()).unwrap(),
            Arc::new(ContentExtractor::new(&ExtractorConfig::default()).unwrap()),
            indexer,
        ))
    }

    fn page(title: &str, content: &str, links: &[&str]) -> String {
        let anchors: String = links
            .iter()
            .map(|href| format!("<a href=\"{}\">link</a>", href))
            .collect();
        format!(
            "<html><head><title>{}</title></head><body>\
             <section class=\"content-section\"><p>{}</p></section>{}</body></html>",
            title, content, anchors
        )
    }

    async fn mount(server: &MockServer, route: &str, status: u16, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_raw(body, "text/html"))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_process_page_indexes_and_classifies() {
        let server = MockServer::start().await;
        let base = server.uri();
        mount(&server, "/a", 200, page("A", "About A", &["/a/b", "/a", "/c"])).await;

        let indexer = Arc::new(RecordingIndexer::default());
        let processor = processor(&base, indexer.clone());
        let state = StateHandle::new(0);

        let url = format!("{}/a", base);
        let visit = processor.process_page(&url, &state).await.unwrap();

        assert!(visit.indexed);
        assert_eq!(visit.children, vec![format!("{}/a/b", base)]);
        assert_eq!(*state.state.borrow(), WorkerState::Classifying);

        let documents = indexer.documents.lock().unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].metadata.title, "A");
        assert_eq!(documents[0].metadata.url, url);
        assert!(documents[0].text.contains("About A"));
    }

    #[tokio::test]
    async fn test_process_page_skips_empty_content() {
        let server = MockServer::start().await;
        let base = server.uri();
        // No content section, so the extracted text is empty
        let body = r#"<html><head><title>Empty</title></head>
            <body><p>outside</p><a href="/empty/child">child</a></body></html>"#;
        mount(&server, "/empty", 200, body.to_string()).await;

        let indexer = Arc::new(RecordingIndexer::default());
        let processor = processor(&base, indexer.clone());

        let url = format!("{}/empty", base);
        let visit = processor.process_page(&url, &StateHandle::new(0)).await.unwrap();

        assert!(!visit.indexed);
        assert_eq!(visit.children, vec![format!("{}/empty/child", base)]);
        assert!(indexer.documents.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_process_page_without_title_fails() {
        let server = MockServer::start().await;
        let base = server.uri();
        let body = r#"<html><body><section class="content-section"><p>Untitled</p></section>
            <a href="/untitled/child">child</a></body></html>"#;
        mount(&server, "/untitled", 200, body.to_string()).await;

        let indexer = Arc::new(RecordingIndexer::default());
        let processor = processor(&base, indexer.clone());
        let result = processor
            .process_page(&format!("{}/untitled", base), &StateHandle::new(0))
            .await;

        assert!(matches!(result, Err(CrawlError::Extraction { .. })));
        assert!(indexer.documents.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_process_page_bad_status() {
        let server = MockServer::start().await;
        mount(&server, "/gone", 500, String::new()).await;

        let processor = processor(&server.uri(), Arc::new(RecordingIndexer::default()));
        let result = processor
            .process_page(&format!("{}/gone", server.uri()), &StateHandle::new(0))
            .await;

        assert!(matches!(
            result,
            Err(CrawlError::HttpStatus { status_code: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_worker_survives_panicking_page() {
        let server = MockServer::start().await;
        let base = server.uri();
        mount(&server, "/boom", 200, page("Boom", "content", &[])).await;

        let session = Arc::new(CrawlSession::new(base.clone()));
        let worker = Worker::new(0, session.clone(), processor(&base, Arc::new(PanickingIndexer)));
        let handle = tokio::spawn(worker.run());

        session.frontier().seed(vec![format!("{}/boom", base)]);
        session.frontier().wait_until_empty().await;
        session.frontier().shutdown(1);

        assert_eq!(handle.await.unwrap(), 1);
        assert_eq!(session.stats().exceptions(), 1);
        assert_eq!(session.stats().indexed(), 0);
    }

    #[test]
    fn test_state_handle_tracks_cycle() {
        let state = StateHandle::new(3);
        let mut changes = state.state.subscribe();

        state.set(WorkerState::Fetching);
        assert!(changes.has_changed().unwrap());
        assert_eq!(*changes.borrow_and_update(), WorkerState::Fetching);

        state.set(WorkerState::Idle);
        state.set(WorkerState::Stopped);
        assert!(state.state.borrow().is_terminal());
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new("owned".to_string())), "owned");
        assert_eq!(panic_message(Box::new(7_u8)), "unknown panic");
    }
}
