//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use subsite_crawler::config::{ExtractorConfig, HttpConfig};
use subsite_crawler::index::{DocumentStore, IndexResult, SqliteIndexer};
use subsite_crawler::{Controller, CrawlError, CrawlRequest, Document, Indexer};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Indexer that keeps every document it receives
#[derive(Default)]
struct RecordingIndexer {
    documents: Mutex<Vec<Document>>,
}

impl RecordingIndexer {
    fn urls(&self) -> HashSet<String> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .map(|doc| doc.metadata.url.clone())
            .collect()
    }

    fn get(&self, url: &str) -> Option<Document> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .find(|doc| doc.metadata.url == url)
            .cloned()
    }
}

#[async_trait]
impl Indexer for RecordingIndexer {
    async fn index(&self, document: Document) -> IndexResult<()> {
        self.documents.lock().unwrap().push(document);
        Ok(())
    }
}

fn controller(indexer: Arc<dyn Indexer>) -> Controller {
    Controller::new(&HttpConfig::default(), &ExtractorConfig::default(), indexer)
        .expect("Failed to create controller")
}

/// Builds a page with a title, a main content section and the given links
fn page(title: &str, content: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!(
        r#"<html><head><title>{}</title></head><body>
        <section class="content-section"><p>{}</p></section>
        <nav>{}</nav>
        </body></html>"#,
        title, content, anchors
    )
}

/// Mounts a page that must be fetched exactly once
async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_full_crawl_visits_every_subpage_once() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(&server, "/", page("Home", "Welcome", &["/a", "/b"])).await;
    // "/a" links to itself, to a sibling and to its own child
    mount_page(&server, "/a", page("A", "Section A", &["/a", "/b", "/a/1"])).await;
    mount_page(&server, "/b", page("B", "Section B", &["/b/1", "/a/1"])).await;
    // "/a/1" links back up; parents are never children
    mount_page(&server, "/a/1", page("A1", "Page A1", &["/a", "/"])).await;
    mount_page(&server, "/b/1", page("B1", "Page B1", &[])).await;

    let indexer = Arc::new(RecordingIndexer::default());
    let controller = controller(indexer.clone());

    let report = controller
        .crawl(CrawlRequest::new(base_url.clone()).with_worker_pool_size(4))
        .await
        .expect("Crawl failed");

    assert_eq!(report.visited, 5);
    assert_eq!(report.ok, 5);
    assert_eq!(report.failed(), 0);
    assert_eq!(report.indexed, 5);

    let expected: HashSet<String> = ["", "/a", "/b", "/a/1", "/b/1"]
        .iter()
        .map(|suffix| format!("{}{}", base_url, suffix))
        .collect();
    assert_eq!(indexer.urls(), expected);
    assert_eq!(indexer.documents.lock().unwrap().len(), 5);

    assert!(!controller.is_crawling());
    // wiremock verifies each page was requested exactly once when the server drops
}

#[tokio::test]
async fn test_failing_page_is_isolated() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    for name in ["p1", "p2", "p4", "p5"] {
        mount_page(&server, &format!("/{}", name), page(name, "content", &[])).await;
    }
    Mock::given(method("GET"))
        .and(path("/p3"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let indexer = Arc::new(RecordingIndexer::default());
    let controller = controller(indexer.clone());

    let seeds: Vec<String> = (1..=5).map(|i| format!("{}/p{}", base_url, i)).collect();
    let report = controller
        .crawl(
            CrawlRequest::new(base_url.clone())
                .with_seed_urls(seeds)
                .with_worker_pool_size(2),
        )
        .await
        .expect("Crawl failed");

    assert_eq!(report.visited, 5);
    assert_eq!(report.ok, 4);
    assert_eq!(report.errors, 1);
    assert_eq!(report.exceptions, 0);
    assert_eq!(report.indexed, 4);
    assert!(!indexer.urls().contains(&format!("{}/p3", base_url)));
}

#[tokio::test]
async fn test_unreachable_seed_is_an_exception() {
    // Bind then drop a listener so nothing listens on its port
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let base_url = format!("http://127.0.0.1:{}", port);

    let indexer = Arc::new(RecordingIndexer::default());
    let report = controller(indexer.clone())
        .crawl(CrawlRequest::new(base_url))
        .await
        .expect("Crawl failed");

    assert_eq!(report.visited, 1);
    assert_eq!(report.exceptions, 1);
    assert_eq!(report.indexed, 0);
}

#[tokio::test]
async fn test_pages_without_content_are_not_indexed() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(&server, "/", page("Home", "Welcome", &["/empty", "/full"])).await;
    mount_page(
        &server,
        "/empty",
        r#"<html><head><title>Empty</title></head><body><p>outside</p></body></html>"#.to_string(),
    )
    .await;
    mount_page(&server, "/full", page("Full", "Plenty of text", &[])).await;

    let indexer = Arc::new(RecordingIndexer::default());
    let report = controller(indexer.clone())
        .crawl(CrawlRequest::new(base_url.clone()))
        .await
        .expect("Crawl failed");

    assert_eq!(report.visited, 3);
    assert_eq!(report.ok, 3);
    assert_eq!(report.indexed, 2);
    assert!(!indexer.urls().contains(&format!("{}/empty", base_url)));
}

#[tokio::test]
async fn test_missing_title_is_an_exception() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><body><section class="content-section"><p>No title here</p></section>
        <a href="/child">Child</a></body></html>"#
            .to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/child"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let indexer = Arc::new(RecordingIndexer::default());
    let report = controller(indexer.clone())
        .crawl(CrawlRequest::new(base_url.clone()))
        .await
        .expect("Crawl failed");

    assert_eq!(report.visited, 1);
    assert_eq!(report.exceptions, 1);
    assert_eq!(report.indexed, 0);
    assert!(indexer.get(&base_url).is_none());
}

#[tokio::test]
async fn test_empty_title_is_indexed() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(&server, "/", page("", "Untitled but present", &[])).await;

    let indexer = Arc::new(RecordingIndexer::default());
    controller(indexer.clone())
        .crawl(CrawlRequest::new(base_url.clone()))
        .await
        .expect("Crawl failed");

    let document = indexer.get(&base_url).expect("page should be indexed");
    assert_eq!(document.metadata.title, "");
    assert!(document.text.contains("Untitled but present"));
}

#[tokio::test]
async fn test_links_in_noise_are_not_followed() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body>
        <header class="header"><a href="/from-header">Header</a></header>
        <section class="content-section"><p>Body</p><a href="/kept">Kept</a></section>
        <footer class="footer"><a href="/from-footer">Footer</a></footer>
        </body></html>"#
            .to_string(),
    )
    .await;
    mount_page(&server, "/kept", page("Kept", "Kept page", &[])).await;
    for route in ["/from-header", "/from-footer"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
    }

    let report = controller(Arc::new(RecordingIndexer::default()))
        .crawl(CrawlRequest::new(base_url))
        .await
        .expect("Crawl failed");

    assert_eq!(report.visited, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_second_crawl_is_refused_while_busy() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(page("Slow", "Slow page", &[]), "text/html")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let controller = Arc::new(controller(Arc::new(RecordingIndexer::default())));

    let first = {
        let controller = controller.clone();
        let request = CrawlRequest::new(base_url.clone());
        tokio::spawn(async move { controller.crawl(request).await })
    };

    tokio::time::timeout(Duration::from_secs(2), async {
        while !controller.is_crawling() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("first crawl should start");

    // Refused immediately, without waiting for the running crawl
    let second = tokio::time::timeout(
        Duration::from_millis(200),
        controller.crawl(CrawlRequest::new(base_url.clone())),
    )
    .await
    .expect("busy crawl should return at once");
    match second {
        Err(CrawlError::Busy { base_url: running }) => assert_eq!(running, base_url),
        other => panic!("expected Busy, got {:?}", other),
    }

    let report = first.await.unwrap().expect("first crawl failed");
    assert_eq!(report.visited, 1);
    assert!(!controller.is_crawling());

    // The controller accepts new crawls once the first one is done
    let again = controller
        .crawl(CrawlRequest::new(base_url))
        .await
        .expect("crawl after completion failed");
    assert_eq!(again.visited, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dropped_crawl_stops_its_workers() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    for i in 1..=4 {
        Mock::given(method("GET"))
            .and(path(format!("/p{}", i)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(page("Slow", "Slow page", &[]), "text/html")
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
    }

    let indexer = Arc::new(RecordingIndexer::default());
    let controller = controller(indexer.clone());
    let seeds: Vec<String> = (1..=4).map(|i| format!("{}/p{}", base_url, i)).collect();

    let dropped = tokio::time::timeout(
        Duration::from_millis(50),
        controller.crawl(
            CrawlRequest::new(base_url.clone())
                .with_seed_urls(seeds)
                .with_worker_pool_size(1),
        ),
    )
    .await;
    assert!(dropped.is_err(), "crawl should still be running at the deadline");
    assert!(!controller.is_crawling());

    // Long enough for every page to be fetched if a worker had survived
    tokio::time::sleep(Duration::from_secs(1)).await;

    let requests = server.received_requests().await.unwrap();
    assert!(requests.len() <= 1, "fetched {} pages after drop", requests.len());
    assert!(indexer.urls().is_empty());

    // The slot is free and a fresh crawl runs normally
    let report = controller
        .crawl(
            CrawlRequest::new(base_url.clone()).with_seed_urls(vec![format!("{}/p1", base_url)]),
        )
        .await
        .expect("crawl after drop failed");
    assert_eq!(report.visited, 1);
    assert_eq!(report.indexed, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_separate_controllers_crawl_concurrently() {
    let first_server = MockServer::start().await;
    let second_server = MockServer::start().await;
    mount_page(&first_server, "/", page("One", "First site", &["/x"])).await;
    mount_page(&first_server, "/x", page("X", "First site X", &[])).await;
    mount_page(&second_server, "/", page("Two", "Second site", &[])).await;

    let first_indexer = Arc::new(RecordingIndexer::default());
    let second_indexer = Arc::new(RecordingIndexer::default());
    let first = controller(first_indexer.clone());
    let second = controller(second_indexer.clone());

    let (first_report, second_report) = tokio::join!(
        first.crawl(CrawlRequest::new(first_server.uri())),
        second.crawl(CrawlRequest::new(second_server.uri())),
    );

    assert_eq!(first_report.unwrap().visited, 2);
    assert_eq!(second_report.unwrap().visited, 1);
    assert_eq!(first_indexer.urls().len(), 2);
    assert_eq!(second_indexer.urls().len(), 1);
}

#[tokio::test]
async fn test_crawl_into_sqlite_store() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(&server, "/", page("Home", "Welcome home", &["/docs"])).await;
    mount_page(&server, "/docs", page("Docs", "Read the docs", &[])).await;

    let store = Arc::new(SqliteIndexer::new_in_memory().expect("Failed to open store"));
    let run_id = store.create_run(&base_url, "test-hash").unwrap();

    let report = controller(store.clone())
        .crawl(CrawlRequest::new(base_url.clone()))
        .await
        .expect("Crawl failed");
    store.complete_run(run_id, report.visited as u64).unwrap();

    assert_eq!(store.count_documents().unwrap(), 2);
    assert_eq!(store.count_documents_for_run(run_id).unwrap(), 2);

    let docs = store
        .get_document_by_url(&format!("{}/docs", base_url))
        .unwrap()
        .expect("docs page should be stored");
    assert_eq!(docs.title, "Docs");
    assert!(docs.text.contains("Read the docs"));

    let run = store.get_run(run_id).unwrap();
    assert_eq!(run.visited, Some(2));
}
