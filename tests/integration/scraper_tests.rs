//! End-to-end scraping tests against a mock directory site

use founders_scraper::config::Config;
use founders_scraper::output::{export_csv, export_json, run_qa_pipeline};
use founders_scraper::{FetchPipeline, Scraper, ScraperError, SourceKind, SourceRegistry};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config() -> Config {
    let mut config = Config::default();
    config.user_agent.crawler_name = "TestBot".to_string();
    config.rate_limit.base_delay = 0.0;
    config.rate_limit.jitter_min = 0.0;
    config.rate_limit.jitter_max = 0.0;
    config.rate_limit.backoff_unit = 0.01;
    config.rate_limit.backoff_cap = 0.05;
    config.rate_limit.max_retries = 2;
    config
}

/// Scraper that treats the local mock server as an AngelList host
fn create_scraper() -> Scraper {
    let pipeline = FetchPipeline::from_config(&create_test_config()).unwrap();
    let registry = SourceRegistry::default().with_rule("127.0.0.1", SourceKind::AngelList);
    Scraper::new(pipeline, registry)
}

const STARTUP_PAGE: &str = r#"<html><body>
    <h1 class="startup-name">Acme Rockets</h1>
    <span class="company-url">acme.io</span>
    <p class="tagline">Reusable rockets for everyone</p>
</body></html>"#;

#[tokio::test]
async fn test_scrape_url_extracts_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/company/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_string(STARTUP_PAGE))
        .mount(&server)
        .await;

    let scraper = create_scraper();
    let url = format!("{}/company/acme", server.uri());
    let record = scraper.scrape_url(&url).await.unwrap();

    assert_eq!(record.name, "Acme Rockets");
    assert_eq!(record.website, "https://acme.io");
    assert_eq!(record.description, "Reusable rockets for everyone");
    assert_eq!(record.source, "angellist");
    assert_eq!(record.source_url, url);
    assert!(record.id.starts_with("angellist_"));

    let snapshot = scraper.pipeline().metrics().snapshot();
    assert_eq!(snapshot.records_extracted, 1);
    assert_eq!(snapshot.successful_requests, 1);
}

#[tokio::test]
async fn test_scrape_batch_collects_records_and_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/company/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_string(STARTUP_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/company/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let scraper = create_scraper();
    let urls = vec![
        format!("{}/company/acme", server.uri()),
        format!("{}/admin", server.uri()),
        "https://example.com/company/unknown".to_string(),
        format!("{}/company/empty", server.uri()),
    ];

    let outcome = scraper.scrape_batch(&urls).await;

    // The empty page still yields a (failing validation) record
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.records[1].name, "");
    assert_eq!(outcome.failures.len(), 2);
    assert_eq!(outcome.failures[0].url, urls[1]);
    assert!(outcome.failures[1].error.contains("No extractor"));
    assert_eq!(outcome.success_rate(), 50.0);

    let snapshot = scraper.pipeline().metrics().snapshot();
    assert_eq!(snapshot.records_extracted, 2);
    assert_eq!(snapshot.total_requests, 2);
}

#[tokio::test]
async fn test_scrape_url_surfaces_fetch_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/company/broken"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&server)
        .await;

    let scraper = create_scraper();
    let err = scraper
        .scrape_url(&format!("{}/company/broken", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, ScraperError::ExhaustedRetries { attempts: 2, .. }));
    assert_eq!(scraper.pipeline().metrics().snapshot().records_extracted, 0);
}

#[tokio::test]
async fn test_scraped_records_export_and_qa() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/company/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_string(STARTUP_PAGE))
        .mount(&server)
        .await;

    let scraper = create_scraper();
    let url = format!("{}/company/acme", server.uri());
    let outcome = scraper.scrape_batch(&[url.clone(), url]).await;
    assert_eq!(outcome.records.len(), 2);

    let dir = TempDir::new().unwrap();
    let json_path = dir.path().join("companies.json");
    export_json(&outcome.records, &json_path).unwrap();
    export_csv(&outcome.records, &dir.path().join("companies.csv")).unwrap();

    let values: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    let (results, report) = run_qa_pipeline(&values);

    assert_eq!(results.validation.valid_records, 2);
    assert!(report.contains("**Records analyzed**: 2"));
}
