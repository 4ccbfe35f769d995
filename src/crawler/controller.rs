//! Crawl controller - one crawl at a time, from seeding to shutdown
//!
//! The controller owns the long-lived collaborators (HTTP client, content
//! extractor, indexer) and creates a fresh [`CrawlSession`] for every accepted
//! crawl. A second `crawl()` while one is running is refused immediately.

use crate::config::{validate_worker_pool_size, Config, ExtractorConfig, HttpConfig};
use crate::crawler::fetcher::build_http_client;
use crate::crawler::parser::ContentExtractor;
use crate::crawler::session::{CrawlReport, CrawlSession};
use crate::crawler::worker::{PageProcessor, Worker};
use crate::index::Indexer;
use crate::url::validate_base_url;
use crate::CrawlError;
use reqwest::Client;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinSet;

/// Worker pool size used when neither the request nor the configuration sets one
pub const DEFAULT_WORKER_POOL_SIZE: usize = 1;

/// Parameters of one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    pub base_url: String,
    pub seed_urls: Vec<String>,
    pub worker_pool_size: Option<usize>,
}

impl CrawlRequest {
    /// Creates a request that starts from the base URL itself
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            seed_urls: Vec::new(),
            worker_pool_size: None,
        }
    }

    pub fn with_seed_urls<I, S>(mut self, seed_urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seed_urls = seed_urls.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_worker_pool_size(mut self, size: usize) -> Self {
        self.worker_pool_size = Some(size);
        self
    }

    /// Builds a request from the `[crawler]` section of a configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.crawler.base_url.clone())
            .with_seed_urls(config.crawler.seed_urls.clone())
            .with_worker_pool_size(config.crawler.worker_pool_size)
    }
}

/// Runs crawls, one at a time
pub struct Controller {
    client: Client,
    extractor: Arc<ContentExtractor>,
    indexer: Arc<dyn Indexer>,
    default_worker_pool_size: usize,
    active: Mutex<Option<String>>,
}

/// Clears the active-crawl slot when dropped
struct ActiveCrawl<'a> {
    slot: &'a Mutex<Option<String>>,
}

impl Drop for ActiveCrawl<'_> {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl Controller {
    /// Creates a controller from transport and extraction settings
    ///
    /// # Returns
    ///
    /// * `Ok(Controller)` - Ready to crawl
    /// * `Err(CrawlError)` - The HTTP client could not be built or a selector is invalid
    pub fn new(
        http: &HttpConfig,
        extractor: &ExtractorConfig,
        indexer: Arc<dyn Indexer>,
    ) -> Result<Self, CrawlError> {
        Ok(Self {
            client: build_http_client(http)?,
            extractor: Arc::new(ContentExtractor::new(extractor)?),
            indexer,
            default_worker_pool_size: DEFAULT_WORKER_POOL_SIZE,
            active: Mutex::new(None),
        })
    }

    /// Creates a controller from a full configuration
    ///
    /// The configured pool size becomes the default for requests that do not
    /// set one.
    pub fn from_config(config: &Config, indexer: Arc<dyn Indexer>) -> Result<Self, CrawlError> {
        let mut controller = Self::new(&config.http, &config.extractor, indexer)?;
        controller.default_worker_pool_size = config.crawler.worker_pool_size;
        Ok(controller)
    }

    fn active(&self) -> MutexGuard<'_, Option<String>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns true while a crawl is running
    pub fn is_crawling(&self) -> bool {
        self.active().is_some()
    }

    /// Base URL of the running crawl, if any
    pub fn active_base_url(&self) -> Option<String> {
        self.active().clone()
    }

    /// Claims the single-flight slot or reports the crawl already holding it
    fn begin(&self, base_url: &str) -> Result<ActiveCrawl<'_>, CrawlError> {
        let mut active = self.active();
        if let Some(running) = active.as_ref() {
            tracing::warn!("an existing crawl is in progress ({})", running);
            return Err(CrawlError::Busy {
                base_url: running.clone(),
            });
        }
        *active = Some(base_url.to_string());
        Ok(ActiveCrawl { slot: &self.active })
    }

    /// Crawls every page reachable below the request's base URL
    ///
    /// Returns once every discovered URL has been processed and every worker has
    /// exited. Page failures are logged and counted in the report; only caller
    /// errors are returned.
    ///
    /// # Errors
    ///
    /// * `CrawlError::Busy` - Another crawl is running on this controller
    /// * `CrawlError::UrlError` - The base URL is empty, unparsable or not HTTP(S)
    /// * `CrawlError::InvalidArgument` - A seed URL is invalid
    /// * `CrawlError::Config` - The worker pool size is out of range
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use subsite_crawler::config::{ExtractorConfig, HttpConfig};
    /// use subsite_crawler::index::SqliteIndexer;
    /// use subsite_crawler::{Controller, CrawlRequest};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let indexer = Arc::new(SqliteIndexer::new_in_memory()?);
    /// let controller = Controller::new(&HttpConfig::default(), &ExtractorConfig::default(), indexer)?;
    /// let report = controller
    ///     .crawl(CrawlRequest::new("https://example.com").with_worker_pool_size(4))
    ///     .await?;
    /// println!("visited {} urls", report.visited);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn crawl(&self, request: CrawlRequest) -> Result<CrawlReport, CrawlError> {
        let _active = self.begin(&request.base_url)?;

        validate_base_url(&request.base_url)?;
        for seed in &request.seed_urls {
            validate_base_url(seed).map_err(|e| {
                CrawlError::InvalidArgument(format!("invalid seed URL '{}': {}", seed, e))
            })?;
        }
        let pool_size = request
            .worker_pool_size
            .unwrap_or(self.default_worker_pool_size);
        validate_worker_pool_size(pool_size)?;

        let seeds = if request.seed_urls.is_empty() {
            vec![request.base_url.clone()]
        } else {
            request.seed_urls
        };

        tracing::info!(
            "Starting crawl of {} with {} workers and {} seeds",
            request.base_url,
            pool_size,
            seeds.len()
        );

        let session = Arc::new(CrawlSession::new(request.base_url.clone()));
        let processor = Arc::new(PageProcessor::new(
            request.base_url,
            self.client.clone(),
            self.extractor.clone(),
            self.indexer.clone(),
        ));

        // Declared after `_active`: dropping this future aborts the workers
        // before the busy slot is released.
        let mut workers = JoinSet::new();
        for id in 0..pool_size {
            workers.spawn(Worker::new(id, session.clone(), processor.clone()).run());
        }

        let seeded = session.frontier().seed(seeds);
        tracing::debug!("Seeded frontier with {} URLs", seeded);

        session.frontier().wait_until_empty().await;
        session.frontier().shutdown(pool_size);

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(processed) => tracing::debug!("Worker finished after {} pages", processed),
                Err(e) => tracing::error!("Worker failed: {}", e),
            }
        }

        let report = session.report();
        tracing::info!("visited {} urls", report.visited);
        Ok(report)
    }
}
