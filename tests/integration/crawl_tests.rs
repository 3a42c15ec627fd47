//! Integration tests for the crawler
//!
//! These tests use wiremock to serve bookmarked pages and run whole batches
//! end-to-end into temporary output directories.

use chrono::{TimeZone, Utc};
use pocket_clipper::config::Config;
use pocket_clipper::crawler::{ContentConverter, ConversionError, Crawler};
use pocket_clipper::output::{CrawlOutcome, FailureKind};
use pocket_clipper::{ClipperError, LinkRecord};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing under `base_dir`
pub fn create_test_config(base_dir: &Path, timeout_secs: u64) -> Config {
    let mut config = Config::default();
    config.output.base_dir = base_dir.to_string_lossy().into_owned();
    config.crawler.request_timeout_secs = timeout_secs;
    config
}

pub fn link(title: &str, url: String) -> LinkRecord {
    LinkRecord::new(
        title,
        url,
        Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        vec!["saved".to_string()],
        "unread",
    )
}

pub async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body, "text/html"),
        )
        .mount(server)
        .await;
}

fn simple_page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body><p>{}</p></body></html>",
        title, body
    )
}

fn clipping_count(base_dir: &Path) -> usize {
    match std::fs::read_dir(base_dir.join("clippings")) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}

fn find<'a>(outcomes: &'a [CrawlOutcome], url: &str) -> &'a CrawlOutcome {
    outcomes
        .iter()
        .find(|o| o.url == url)
        .unwrap_or_else(|| panic!("no outcome for {}", url))
}

/// Returns a URL on a port nothing listens on
async fn unreachable_url() -> String {
    let server = MockServer::start().await;
    let url = format!("{}/gone", server.uri());
    drop(server);
    url
}

/// Converter that rejects any page containing a marker
struct PickyConverter;

impl ContentConverter for PickyConverter {
    fn convert(&self, html: &str) -> Result<String, ConversionError> {
        if html.contains("unconvertible") {
            Err(ConversionError::new("unsupported markup"))
        } else {
            Ok("converted body".to_string())
        }
    }
}

#[tokio::test]
async fn test_full_batch_writes_clippings() {
    let server = MockServer::start().await;
    let base = server.uri();
    for n in 1..=3 {
        mount_page(
            &server,
            &format!("/page{}", n),
            simple_page(&format!("Page {}", n), &format!("Content {}", n)),
        )
        .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let crawler = Crawler::new(&create_test_config(dir.path(), 5)).unwrap();
    let links = (1..=3)
        .map(|n| link(&format!("Saved {}", n), format!("{}/page{}", base, n)))
        .collect();

    let outcomes = crawler
        .run(links, &CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| o.success && o.error.is_empty()));
    assert_eq!(clipping_count(dir.path()), 3);

    let written = std::fs::read_to_string(dir.path().join("clippings").join("Page 2.md")).unwrap();
    assert!(written.starts_with("---\ntitle: \"Page 2\"\n"));
    assert!(written.contains(&format!("source: \"{}/page2\"", base)));
    assert!(written.contains("  - \"clippings\"\n  - \"pocket\"\n  - \"saved\"\n"));
    assert!(written.contains("Content 2"));
}

#[tokio::test]
async fn test_failures_are_isolated() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/ok", simple_page("Fine", "ok")).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let crawler = Crawler::new(&create_test_config(dir.path(), 5)).unwrap();
    let unreachable = unreachable_url().await;
    let links = vec![
        link("Ok", format!("{}/ok", base)),
        link("Broken", format!("{}/broken", base)),
        link("Gone", unreachable.clone()),
    ];

    let outcomes = crawler.run(links, &CancellationToken::new()).await.unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(find(&outcomes, &format!("{}/ok", base)).success);

    let broken = find(&outcomes, &format!("{}/broken", base));
    assert!(!broken.success);
    assert_eq!(broken.failure, Some(FailureKind::Fetch));
    assert!(broken.error.contains("HTTP 500"));

    let gone = find(&outcomes, &unreachable);
    assert!(!gone.success);
    assert_eq!(gone.failure, Some(FailureKind::Fetch));
    assert!(!gone.error.is_empty());

    assert_eq!(clipping_count(dir.path()), 1);
}

#[tokio::test]
async fn test_timeout_is_classified_separately() {
    let server = MockServer::start().await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(simple_page("Slow", "late"), "text/html")
                .set_delay(Duration::from_secs(4)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let crawler = Crawler::new(&create_test_config(dir.path(), 1)).unwrap();
    let links = vec![
        link("Slow", format!("{}/slow", base)),
        link("Missing", format!("{}/missing", base)),
    ];

    let outcomes = crawler.run(links, &CancellationToken::new()).await.unwrap();

    let slow = find(&outcomes, &format!("{}/slow", base));
    assert!(!slow.success);
    assert!(slow.is_timeout());
    assert!(slow.error.contains("timeout"));

    let missing = find(&outcomes, &format!("{}/missing", base));
    assert!(!missing.success);
    assert!(!missing.is_timeout());
    assert_eq!(missing.failure, Some(FailureKind::Fetch));
}

#[tokio::test]
async fn test_title_resolution_precedence() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/og",
        r#"<html><head><title>Tag Title</title><meta property="og:title" content="Graph Title"></head><body></body></html>"#
            .to_string(),
    )
    .await;
    mount_page(
        &server,
        "/url-title",
        format!(
            "<html><head><title>{}/url-title</title></head><body><h1>Heading Title</h1></body></html>",
            base
        ),
    )
    .await;
    mount_page(
        &server,
        "/bare",
        "<html><head></head><body><p>no title here</p></body></html>".to_string(),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let crawler = Crawler::new(&create_test_config(dir.path(), 5)).unwrap();
    let links = vec![
        link("Raw One", format!("{}/og", base)),
        link("Raw Two", format!("{}/url-title", base)),
        link("Raw Three", format!("{}/bare", base)),
    ];

    let outcomes = crawler.run(links, &CancellationToken::new()).await.unwrap();

    assert_eq!(find(&outcomes, &format!("{}/og", base)).title, "Graph Title");
    assert_eq!(
        find(&outcomes, &format!("{}/url-title", base)).title,
        "Heading Title"
    );
    assert_eq!(find(&outcomes, &format!("{}/bare", base)).title, "Raw Three");

    let clippings = dir.path().join("clippings");
    assert!(clippings.join("Graph Title.md").exists());
    assert!(clippings.join("Heading Title.md").exists());
    assert!(clippings.join("Raw Three.md").exists());
}

#[tokio::test]
async fn test_published_line_only_when_resolvable() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(
        &server,
        "/dated",
        r#"<html><head><title>Dated</title>
        <meta property="article:published_time" content="2022-08-09T12:00:00Z">
        <meta name="description" content="Has a date">
        </head><body></body></html>"#
            .to_string(),
    )
    .await;
    mount_page(&server, "/undated", simple_page("Undated", "x")).await;

    let dir = tempfile::tempdir().unwrap();
    let crawler = Crawler::new(&create_test_config(dir.path(), 5)).unwrap();
    let links = vec![
        link("a", format!("{}/dated", base)),
        link("b", format!("{}/undated", base)),
    ];
    crawler.run(links, &CancellationToken::new()).await.unwrap();

    let clippings = dir.path().join("clippings");
    let dated = std::fs::read_to_string(clippings.join("Dated.md")).unwrap();
    assert!(dated.contains("published: 2022-08-09\n"));
    assert!(dated.contains("description: \"Has a date\"\n"));

    let undated = std::fs::read_to_string(clippings.join("Undated.md")).unwrap();
    assert!(!undated.contains("published"));
    assert!(!undated.contains("description"));
    assert!(undated.contains("created: 2023-11-14\n"));
}

#[tokio::test]
async fn test_conversion_failure_recorded() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/good", simple_page("Good", "fine")).await;
    mount_page(&server, "/bad", simple_page("Bad", "unconvertible")).await;

    let dir = tempfile::tempdir().unwrap();
    let crawler =
        Crawler::with_converter(&create_test_config(dir.path(), 5), Arc::new(PickyConverter))
            .unwrap();
    let links = vec![
        link("Good", format!("{}/good", base)),
        link("Bad", format!("{}/bad", base)),
    ];

    let outcomes = crawler.run(links, &CancellationToken::new()).await.unwrap();

    let bad = find(&outcomes, &format!("{}/bad", base));
    assert_eq!(bad.failure, Some(FailureKind::Conversion));
    assert_eq!(bad.error, "Conversion failed: unsupported markup");

    let clippings = dir.path().join("clippings");
    assert!(!clippings.join("Bad.md").exists());
    let good = std::fs::read_to_string(clippings.join("Good.md")).unwrap();
    assert!(good.ends_with("---\n\nconverted body"));
}

#[tokio::test]
async fn test_write_failure_recorded() {
    let server = MockServer::start().await;
    mount_page(&server, "/page", simple_page("Page", "x")).await;

    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file in the way").unwrap();

    let crawler = Crawler::new(&create_test_config(&blocker, 5)).unwrap();
    let outcomes = crawler
        .run(
            vec![link("Page", format!("{}/page", server.uri()))],
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].failure, Some(FailureKind::Write));
    assert!(outcomes[0].error.contains("clippings"));
}

#[tokio::test]
async fn test_every_link_gets_an_outcome() {
    let server = MockServer::start().await;
    let base = server.uri();
    for n in 0..20 {
        if n % 4 == 0 {
            Mock::given(method("GET"))
                .and(path(format!("/p{}", n)))
                .respond_with(ResponseTemplate::new(503))
                .mount(&server)
                .await;
        } else {
            mount_page(&server, &format!("/p{}", n), simple_page(&format!("P{}", n), "x")).await;
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let crawler = Crawler::new(&create_test_config(dir.path(), 5)).unwrap();
    let links: Vec<LinkRecord> = (0..20)
        .map(|n| link(&format!("L{}", n), format!("{}/p{}", base, n)))
        .collect();

    let outcomes = crawler.run(links, &CancellationToken::new()).await.unwrap();

    assert_eq!(outcomes.len(), 20);
    assert_eq!(outcomes.iter().filter(|o| o.success).count(), 15);
    for n in 0..20 {
        find(&outcomes, &format!("{}/p{}", base, n));
    }
}

#[tokio::test]
async fn test_bounded_concurrency_completes() {
    let server = MockServer::start().await;
    let base = server.uri();
    for n in 0..6 {
        mount_page(&server, &format!("/b{}", n), simple_page(&format!("B{}", n), "x")).await;
    }

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(dir.path(), 5);
    config.crawler.max_concurrent_fetches = 2;
    let crawler = Crawler::new(&config).unwrap();
    let links = (0..6)
        .map(|n| link("x", format!("{}/b{}", base, n)))
        .collect();

    let outcomes = crawler.run(links, &CancellationToken::new()).await.unwrap();

    assert_eq!(outcomes.len(), 6);
    assert!(outcomes.iter().all(|o| o.success));
    assert_eq!(clipping_count(dir.path()), 6);
}

#[tokio::test]
async fn test_external_cancellation_aborts_batch() {
    let server = MockServer::start().await;
    let base = server.uri();
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(simple_page("Never", "x"), "text/html")
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let crawler = Crawler::new(&create_test_config(dir.path(), 30)).unwrap();
    let links = (0..3)
        .map(|n| link("x", format!("{}/c{}", base, n)))
        .collect();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result = crawler.run(links, &cancel).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(matches!(
        result,
        Err(ClipperError::Cancelled {
            completed: 0,
            total: 3
        })
    ));
    assert_eq!(clipping_count(dir.path()), 0);
}

#[tokio::test]
async fn test_cancellation_reaches_queued_links() {
    let server = MockServer::start().await;
    let base = server.uri();
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(simple_page("Held", "x"), "text/html")
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(dir.path(), 30);
    config.crawler.max_concurrent_fetches = 1;
    let crawler = Crawler::new(&config).unwrap();
    let links = (0..4)
        .map(|n| link("x", format!("{}/q{}", base, n)))
        .collect();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result = crawler.run(links, &cancel).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(matches!(
        result,
        Err(ClipperError::Cancelled {
            completed: 0,
            total: 4
        })
    ));

    // Only the permit holder ever reached the server.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(clipping_count(dir.path()), 0);
}

#[tokio::test]
async fn test_non_html_response_is_not_clipped() {
    let server = MockServer::start().await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/paper.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    b"%PDF-1.4\xff\xfe\x01binary stream %%EOF".to_vec(),
                    "application/pdf",
                ),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/article", simple_page("Article", "words")).await;

    let dir = tempfile::tempdir().unwrap();
    let crawler = Crawler::new(&create_test_config(dir.path(), 5)).unwrap();
    let links = vec![
        link("Paper", format!("{}/paper.pdf", base)),
        link("Article", format!("{}/article", base)),
    ];

    let outcomes = crawler.run(links, &CancellationToken::new()).await.unwrap();

    let paper = find(&outcomes, &format!("{}/paper.pdf", base));
    assert!(!paper.success);
    assert_eq!(paper.failure, Some(FailureKind::Fetch));
    assert!(paper.error.contains("application/pdf"));

    let clippings = dir.path().join("clippings");
    assert!(!clippings.join("Paper.md").exists());
    assert!(clippings.join("Article.md").exists());
    assert_eq!(clipping_count(dir.path()), 1);
}

#[tokio::test]
async fn test_rerun_with_distinct_titles_adds_files() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/r0", "<html><body></body></html>".to_string()).await;
    mount_page(&server, "/r1", "<html><body></body></html>".to_string()).await;

    let dir = tempfile::tempdir().unwrap();
    let crawler = Crawler::new(&create_test_config(dir.path(), 5)).unwrap();

    for run in ["first", "second"] {
        let links = (0..2)
            .map(|n| link(&format!("{} {}", run, n), format!("{}/r{}", base, n)))
            .collect();
        crawler.run(links, &CancellationToken::new()).await.unwrap();
    }

    assert_eq!(clipping_count(dir.path()), 4);
}

#[tokio::test]
async fn test_rerun_with_same_titles_overwrites() {
    let server = MockServer::start().await;
    let base = server.uri();
    for n in 0..2 {
        mount_page(&server, &format!("/s{}", n), simple_page(&format!("Same {}", n), "first run")).await;
    }

    let dir = tempfile::tempdir().unwrap();
    let crawler = Crawler::new(&create_test_config(dir.path(), 5)).unwrap();
    let links = || -> Vec<LinkRecord> {
        (0..2)
            .map(|n| link("x", format!("{}/s{}", base, n)))
            .collect()
    };

    crawler.run(links(), &CancellationToken::new()).await.unwrap();

    server.reset().await;
    for n in 0..2 {
        mount_page(&server, &format!("/s{}", n), simple_page(&format!("Same {}", n), "second run")).await;
    }
    crawler.run(links(), &CancellationToken::new()).await.unwrap();

    assert_eq!(clipping_count(dir.path()), 2);
    for n in 0..2 {
        let written = std::fs::read_to_string(
            dir.path().join("clippings").join(format!("Same {}.md", n)),
        )
        .unwrap();
        assert!(written.contains("second run"));
        assert!(!written.contains("first run"));
    }
}
