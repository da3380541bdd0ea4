//! Integration tests for the fetch pipeline
//!
//! These tests use wiremock to create mock HTTP servers and drive the full
//! compliance → rate limit → fetch → retry cycle. Delays are configured to
//! zero so the tests run in real time.

use founders_scraper::config::Config;
use founders_scraper::{FetchPipeline, ScraperError, TransportKind};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a configuration with no politeness delays
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.user_agent.crawler_name = "TestBot".to_string();
    config.rate_limit.base_delay = 0.0;
    config.rate_limit.jitter_min = 0.0;
    config.rate_limit.jitter_max = 0.0;
    config.rate_limit.backoff_unit = 0.01;
    config.rate_limit.backoff_cap = 0.05;
    config.rate_limit.default_retry_after = 0;
    config.rate_limit.max_retries = 3;
    config.robots.timeout = 2;
    config.http.connect_timeout = 2;
    config.http.read_timeout = 5;
    config
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_successful_fetch() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/company/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Acme</h1>"))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = FetchPipeline::from_config(&create_test_config()).unwrap();
    let url = format!("{}/company/acme", server.uri());

    let page = pipeline.fetch(&url).await.unwrap();
    assert_eq!(page.status, 200);
    assert_eq!(page.url, url);
    assert_eq!(page.final_url, url);
    assert_eq!(page.text(), "<h1>Acme</h1>");

    let snapshot = pipeline.metrics().snapshot();
    assert_eq!(snapshot.total_requests, 1);
    assert_eq!(snapshot.successful_requests, 1);
    assert_eq!(snapshot.success_rate, 100.0);
}

#[tokio::test]
async fn test_server_errors_exhaust_retries() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let pipeline = FetchPipeline::from_config(&create_test_config()).unwrap();
    let url = format!("{}/flaky", server.uri());

    let err = pipeline.fetch_with_retries(&url, 3).await.unwrap_err();
    match err {
        ScraperError::ExhaustedRetries { attempts, last, .. } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last, ScraperError::HttpStatus { status: 500, .. }));
        }
        other => panic!("expected ExhaustedRetries, got {:?}", other),
    }

    let snapshot = pipeline.metrics().snapshot();
    assert_eq!(snapshot.total_requests, 3);
    assert_eq!(snapshot.failed_requests, 3);
    assert_eq!(snapshot.successful_requests, 0);
    assert_eq!(snapshot.error_types.get("http_500"), Some(&3));
    assert_eq!(snapshot.success_rate, 0.0);
}

#[tokio::test]
async fn test_not_found_is_retried_without_backoff() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let pipeline = FetchPipeline::from_config(&create_test_config()).unwrap();
    let err = pipeline
        .fetch_with_retries(&format!("{}/gone", server.uri()), 2)
        .await
        .unwrap_err();

    assert!(matches!(err, ScraperError::ExhaustedRetries { attempts: 2, .. }));
    assert_eq!(pipeline.metrics().snapshot().error_types.get("http_404"), Some(&2));
}

#[tokio::test]
async fn test_rate_limited_then_success() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = FetchPipeline::from_config(&create_test_config()).unwrap();
    let page = pipeline
        .fetch(&format!("{}/busy", server.uri()))
        .await
        .unwrap();
    assert_eq!(page.text(), "ok");

    let snapshot = pipeline.metrics().snapshot();
    assert_eq!(snapshot.total_requests, 2);
    assert_eq!(snapshot.successful_requests, 1);
    assert_eq!(snapshot.rate_limit_hits, 1);
    assert_eq!(snapshot.error_types.get("http_429"), Some(&1));
}

#[tokio::test]
async fn test_rate_limited_without_retry_after_uses_default_wait() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.rate_limit.default_retry_after = 1;
    let pipeline = FetchPipeline::from_config(&config).unwrap();

    let start = Instant::now();
    let page = pipeline
        .fetch(&format!("{}/busy", server.uri()))
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_secs(1));
    assert_eq!(page.text(), "ok");
    assert_eq!(pipeline.metrics().snapshot().rate_limit_hits, 1);
}

#[tokio::test]
async fn test_rate_limited_on_every_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(2)
        .mount(&server)
        .await;

    let pipeline = FetchPipeline::from_config(&create_test_config()).unwrap();
    let err = pipeline
        .fetch_with_retries(&format!("{}/busy", server.uri()), 2)
        .await
        .unwrap_err();

    match err {
        ScraperError::ExhaustedRetries { last, .. } => {
            assert!(matches!(*last, ScraperError::RateLimited { .. }));
        }
        other => panic!("expected ExhaustedRetries, got {:?}", other),
    }
    assert_eq!(pipeline.metrics().snapshot().rate_limit_hits, 2);
}

#[tokio::test]
async fn test_disallowed_url_is_never_requested() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /private").await;

    Mock::given(method("GET"))
        .and(path("/private/data"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let pipeline = FetchPipeline::from_config(&create_test_config()).unwrap();
    let err = pipeline
        .fetch(&format!("{}/private/data", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, ScraperError::ComplianceDenied { .. }));
    assert!(!err.is_retryable());
    assert_eq!(pipeline.metrics().snapshot().total_requests, 0);
}

#[tokio::test]
async fn test_batch_continues_after_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/public"))
        .respond_with(ResponseTemplate::new(200).set_body_string("public page"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/private"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let pipeline = FetchPipeline::from_config(&create_test_config()).unwrap();
    let urls = vec![
        format!("{}/public", server.uri()),
        format!("{}/private", server.uri()),
    ];

    let outcome = pipeline.fetch_batch(&urls).await;
    assert_eq!(outcome.pages.len(), 1);
    assert_eq!(outcome.pages[0].url, urls[0]);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].url, urls[1]);
    assert!(outcome.failures[0].error.contains("robots.txt"));

    let snapshot = pipeline.metrics().snapshot();
    assert_eq!(snapshot.successful_requests, 1);
    assert_eq!(snapshot.total_requests, 1);
}

#[tokio::test]
async fn test_crawl_delay_above_base_delay_is_respected() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nCrawl-delay: 0.3").await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let pipeline = FetchPipeline::from_config(&create_test_config()).unwrap();
    let start = Instant::now();
    pipeline
        .fetch(&format!("{}/slow", server.uri()))
        .await
        .unwrap();
    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_absurd_crawl_delay_does_not_stall_batch() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nCrawl-delay: 1e20").await;

    Mock::given(method("GET"))
        .and(path("/company"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = FetchPipeline::from_config(&create_test_config()).unwrap();
    let url = format!("{}/company", server.uri());

    let compliance = pipeline.compliance().check(&url).await;
    assert!(compliance.allowed);
    assert_eq!(compliance.crawl_delay, None);

    let outcome = tokio::time::timeout(
        Duration::from_secs(10),
        pipeline.fetch_batch(&[url]),
    )
    .await
    .unwrap();
    assert_eq!(outcome.pages.len(), 1);
    assert!(outcome.failures.is_empty());
}

#[tokio::test]
async fn test_connection_refused_fails_open_then_exhausts() {
    // Reserve a port and release it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let pipeline = FetchPipeline::from_config(&create_test_config()).unwrap();
    let url = format!("http://127.0.0.1:{}/company", port);

    let compliance = pipeline.compliance().check(&url).await;
    assert!(compliance.allowed);
    assert!(compliance.error.is_some());

    let err = pipeline.fetch_with_retries(&url, 2).await.unwrap_err();
    match err {
        ScraperError::ExhaustedRetries { attempts, last, .. } => {
            assert_eq!(attempts, 2);
            assert!(matches!(
                *last,
                ScraperError::Transport {
                    kind: TransportKind::Connect,
                    ..
                }
            ));
        }
        other => panic!("expected ExhaustedRetries, got {:?}", other),
    }

    let snapshot = pipeline.metrics().snapshot();
    assert_eq!(snapshot.failed_requests, 2);
    assert_eq!(snapshot.error_types.get("connect"), Some(&2));
}
