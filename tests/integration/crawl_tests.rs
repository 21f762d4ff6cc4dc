//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use outlink::config::{Config, ReportFormat, RetryPolicy};
use outlink::crawler::{crawl, Coordinator, RetryPrompt, ShutdownHandle};
use outlink::output::{write_reports, LinkMap, RunStatus};
use outlink::url::{CanonicalUrl, LinkKind, TargetHostnames};
use outlink::OutlinkError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts and a small pool
fn create_test_config(retry: RetryPolicy) -> Config {
    let mut config = Config::default();
    config.crawler.workers = 4;
    config.crawler.connect_timeout_secs = 2;
    config.crawler.read_timeout_secs = 5;
    config.crawler.retry_policy = retry;
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html.to_string(), "text/html"))
        .mount(server)
        .await;
}

/// Absolute URL of a route on the mock server
fn at(server: &MockServer, route: &str) -> String {
    format!("{}{}", server.uri(), route)
}

fn seed(server: &MockServer) -> String {
    at(server, "/")
}

#[tokio::test]
async fn test_full_crawl_classifies_links() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    mount_page(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body>
            <a href="/about">About</a>
            <a href="http://partner.test/offer">Partner</a>
            <a href="http://www.partner.test/offer#terms">Partner again</a>
            <a href="http://elsewhere.test/">Elsewhere</a>
            <a href="mailto:team@example.test">Mail</a>
            <img src="http://cdn.partner.test/logo.png">
        </body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/about",
        r#"<html><body>
            <a href="/">Home</a>
            <a href="http://partner.test/about-us">Partner</a>
        </body></html>"#,
    )
    .await;

    let targets = TargetHostnames::new(["partner.test"]);
    let report = crawl(
        create_test_config(RetryPolicy::Never),
        &seed(&server),
        targets,
        None,
    )
    .await
    .expect("crawl should succeed");

    let home = seed(&server);
    let about = at(&server, "/about");

    assert_eq!(report.status, RunStatus::Completed);
    assert!(report.broken.is_empty());
    assert_eq!(report.crawled.len(), 2);
    assert!(report.crawled.contains(&home));
    assert!(report.crawled.contains(&about));

    // Target links, grouped by parent page
    let from_home = &report.external()[&home];
    assert!(from_home.contains("http://partner.test/offer"));
    assert!(!from_home.contains("http://www.partner.test/offer"));
    assert!(from_home.contains("http://cdn.partner.test/logo.png"));
    assert_eq!(from_home.len(), 2);
    assert!(report.external()[&about].contains("http://partner.test/about-us"));

    // Everything else that left the site
    assert!(report.non_target()[&home].contains("http://elsewhere.test/"));
    assert!(!report.links.contains(LinkKind::TargetExternal, "http://elsewhere.test/"));

    // Internal links are recorded but never reported as external
    assert!(report.links.contains(LinkKind::Internal, &about));
}

#[tokio::test]
async fn test_target_link_reported_once_and_non_target_report_empty() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(
        &server,
        "/",
        r#"<html><body>
            <a href="/about">About</a>
            <a href="http://partner.test/x">Partner</a>
            <a href="https://www.partner.test/x">Partner, secure</a>
            <a href="http://www.partner.test/x#section">Partner, www</a>
        </body></html>"#,
    )
    .await;
    mount_page(&server, "/about", "<p>About us</p>").await;

    let report = crawl(
        create_test_config(RetryPolicy::Never),
        &seed(&server),
        TargetHostnames::new(["partner.test"]),
        None,
    )
    .await
    .unwrap();

    let mut expected = LinkMap::new();
    expected.insert(
        seed(&server),
        BTreeSet::from(["http://partner.test/x".to_string()]),
    );
    assert_eq!(report.external(), &expected);
    assert!(report.non_target().is_empty());
    assert_eq!(
        report.crawled,
        BTreeSet::from([seed(&server), at(&server, "/about")])
    );
}

#[tokio::test]
async fn test_no_targets_means_every_external_link_is_a_target() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(
        &server,
        "/",
        r#"<a href="http://one.test/">1</a><a href="http://two.test/">2</a>"#,
    )
    .await;

    let report = crawl(
        create_test_config(RetryPolicy::Never),
        &seed(&server),
        TargetHostnames::default(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.links.link_count(LinkKind::TargetExternal), 2);
    assert!(report.non_target().is_empty());
}

#[tokio::test]
async fn test_robots_disallowed_urls_never_fetched_or_reported() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /private").await;
    mount_page(
        &server,
        "/",
        r#"<a href="/private/secret">Secret</a><a href="/public">Public</a>"#,
    )
    .await;
    mount_page(&server, "/public", "<p>nothing here</p>").await;

    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let report = crawl(
        create_test_config(RetryPolicy::Never),
        &seed(&server),
        TargetHostnames::default(),
        None,
    )
    .await
    .unwrap();

    let secret = at(&server, "/private/secret");
    assert!(report.crawled.contains(&at(&server, "/public")));
    assert!(!report.attempted.contains(&secret));
    assert!(!report.broken.contains_key(&secret));
    for kind in [
        LinkKind::Internal,
        LinkKind::TargetExternal,
        LinkKind::NonTargetExternal,
    ] {
        assert!(!report.links.contains(kind, &secret));
    }
}

#[tokio::test]
async fn test_missing_robots_is_fatal() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<p>hello</p>").await;

    let result = crawl(
        create_test_config(RetryPolicy::Never),
        &seed(&server),
        TargetHostnames::default(),
        None,
    )
    .await;

    assert!(matches!(result, Err(OutlinkError::RobotsUnavailable { .. })));
}

#[tokio::test]
async fn test_missing_robots_tolerated_when_not_required() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<p>hello</p>").await;

    let mut config = create_test_config(RetryPolicy::Never);
    config.crawler.require_robots = false;

    let report = crawl(config, &seed(&server), TargetHostnames::default(), None)
        .await
        .unwrap();
    assert!(report.crawled.contains(&seed(&server)));
}

#[tokio::test]
async fn test_timeout_is_broken_then_recovered_by_auto_retry() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(&server, "/", r#"<a href="/slow">Slow</a>"#).await;

    // First request stalls past the read timeout, later ones answer at once
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<p>finally</p>", "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, "/slow", "<p>finally</p>").await;

    let mut config = create_test_config(RetryPolicy::Auto);
    config.crawler.connect_timeout_secs = 1;
    config.crawler.read_timeout_secs = 1;

    let report = crawl(config, &seed(&server), TargetHostnames::default(), None)
        .await
        .unwrap();

    let slow = at(&server, "/slow");
    assert_eq!(report.retry_rounds, 1);
    assert!(report.crawled.contains(&slow));
    assert!(report.broken.is_empty());
}

#[tokio::test]
async fn test_auto_retry_is_bounded() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(&server, "/", r#"<a href="/gone">Gone</a>"#).await;

    let mut config = create_test_config(RetryPolicy::Auto);
    config.crawler.max_retry_rounds = 2;

    let report = crawl(config, &seed(&server), TargetHostnames::default(), None)
        .await
        .unwrap();

    assert_eq!(report.retry_rounds, 2);
    assert_eq!(report.broken[&at(&server, "/gone")], "HTTP 404");
}

#[tokio::test]
async fn test_never_policy_leaves_broken_links() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(&server, "/", r#"<a href="/gone">Gone</a><a href="/error">Err</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let report = crawl(
        create_test_config(RetryPolicy::Never),
        &seed(&server),
        TargetHostnames::default(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.retry_rounds, 0);
    assert_eq!(report.broken.len(), 2);
    assert_eq!(report.broken[&at(&server, "/gone")], "HTTP 404");
    assert_eq!(report.broken[&at(&server, "/error")], "HTTP 500");
    assert_eq!(report.crawled.len(), 1);
    assert_eq!(report.attempted.len(), 3);
}

/// Agrees to the first retry only
struct RetryOnce {
    asked: Arc<AtomicUsize>,
}

impl RetryPrompt for RetryOnce {
    fn confirm_retry(&mut self, broken: &[CanonicalUrl]) -> bool {
        assert_eq!(broken.len(), 1);
        self.asked.fetch_add(1, Ordering::SeqCst) == 0
    }
}

#[tokio::test]
async fn test_prompt_policy_asks_at_every_drain() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(&server, "/", r#"<a href="/gone">Gone</a>"#).await;

    let asked = Arc::new(AtomicUsize::new(0));
    let prompt = RetryOnce {
        asked: Arc::clone(&asked),
    };

    let report = crawl(
        create_test_config(RetryPolicy::Prompt),
        &seed(&server),
        TargetHostnames::default(),
        Some(Box::new(prompt)),
    )
    .await
    .unwrap();

    assert_eq!(asked.load(Ordering::SeqCst), 2);
    assert_eq!(report.retry_rounds, 1);
    assert!(report.broken.contains_key(&at(&server, "/gone")));
}

/// Requests shutdown while agreeing to retry
struct ShutdownThenRetry {
    shutdown: ShutdownHandle,
}

impl RetryPrompt for ShutdownThenRetry {
    fn confirm_retry(&mut self, _broken: &[CanonicalUrl]) -> bool {
        self.shutdown.shutdown();
        true
    }
}

#[tokio::test]
async fn test_shutdown_after_retry_decision_keeps_broken_links() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(&server, "/", r#"<a href="/gone">Gone</a>"#).await;

    let coordinator = Coordinator::new(
        create_test_config(RetryPolicy::Prompt),
        &seed(&server),
        TargetHostnames::default(),
    )
    .await
    .unwrap();
    let prompt = ShutdownThenRetry {
        shutdown: coordinator.shutdown_handle(),
    };
    let report = coordinator
        .with_prompt(Box::new(prompt))
        .run()
        .await
        .unwrap();

    let gone = at(&server, "/gone");
    assert_eq!(report.status, RunStatus::Aborted);
    assert_eq!(report.retry_rounds, 1);
    assert_eq!(report.broken[&gone], "HTTP 404");
    assert!(!report.abandoned.contains(&gone));
}

#[tokio::test]
async fn test_prompt_policy_without_prompt_does_not_retry() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(&server, "/", r#"<a href="/gone">Gone</a>"#).await;

    let report = crawl(
        create_test_config(RetryPolicy::Prompt),
        &seed(&server),
        TargetHostnames::default(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.retry_rounds, 0);
    assert_eq!(report.broken.len(), 1);
}

#[tokio::test]
async fn test_non_html_page_is_crawled_without_links() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(&server, "/", r#"<a href="/brochure.pdf">PDF</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/brochure.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="/hidden">not really html</a>"#, "application/pdf"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let report = crawl(
        create_test_config(RetryPolicy::Never),
        &seed(&server),
        TargetHostnames::default(),
        None,
    )
    .await
    .unwrap();

    assert!(report.crawled.contains(&at(&server, "/brochure.pdf")));
    assert!(report.broken.is_empty());
}

#[tokio::test]
async fn test_redirected_page_links_are_attributed_to_final_url() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(&server, "/", r#"<a href="/old">Old</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    mount_page(&server, "/new", r#"<a href="http://partner.test/">Partner</a>"#).await;

    let report = crawl(
        create_test_config(RetryPolicy::Never),
        &seed(&server),
        TargetHostnames::new(["partner.test"]),
        None,
    )
    .await
    .unwrap();

    let new = at(&server, "/new");
    assert!(report.external()[&new].contains("http://partner.test/"));
    assert!(!report.external().contains_key(&at(&server, "/old")));
}

#[tokio::test]
async fn test_shutdown_before_run_aborts_with_seed_unvisited() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(
        create_test_config(RetryPolicy::Auto),
        &seed(&server),
        TargetHostnames::default(),
    )
    .await
    .unwrap();
    coordinator.shutdown_handle().shutdown();

    let report = coordinator.run().await.unwrap();
    assert_eq!(report.status, RunStatus::Aborted);
    assert!(report.crawled.is_empty());
    assert!(report.abandoned.contains(&seed(&server)));
}

#[tokio::test]
async fn test_reports_written_to_output_directory() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(
        &server,
        "/",
        r#"<a href="http://partner.test/">Partner</a><a href="/gone">Gone</a>"#,
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(RetryPolicy::Never);
    config.output.directory = dir.path().display().to_string();
    config.output.formats = vec![ReportFormat::Html, ReportFormat::Markdown];
    let output = config.output.clone();

    let coordinator = Coordinator::new(config, &seed(&server), TargetHostnames::new(["partner"]))
        .await
        .unwrap()
        .with_config_hash("deadbeef");
    let report = coordinator.run().await.unwrap();

    let written = write_reports(&report, &output).unwrap();
    assert_eq!(written.len(), 5);
    for path in &written {
        assert!(path.exists(), "missing {}", path.display());
        assert!(path.starts_with(dir.path()));
    }

    let names: Vec<String> = written
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    for suffix in [
        "_external_links.html",
        "_non_target_external.html",
        "_broken_links.html",
        "_crawled_links.html",
        "_summary.md",
    ] {
        assert!(
            names.iter().any(|n| n.ends_with(suffix)),
            "no file ending in {}",
            suffix
        );
    }

    let external = written
        .iter()
        .find(|p| p.to_string_lossy().ends_with("_external_links.html"))
        .unwrap();
    let html = std::fs::read_to_string(external).unwrap();
    assert!(html.contains("http://partner.test/"));

    let summary = written
        .iter()
        .find(|p| p.to_string_lossy().ends_with("_summary.md"))
        .unwrap();
    let markdown = std::fs::read_to_string(summary).unwrap();
    assert!(markdown.contains("deadbeef"));
    assert!(markdown.contains(&at(&server, "/gone")));
}
