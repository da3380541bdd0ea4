//! Integration tests for robots.txt and terms-of-service checks

use founders_scraper::config::Config;
use founders_scraper::{ComplianceChecker, ComplianceSource};
use reqwest::Client;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config() -> Config {
    let mut config = Config::default();
    config.user_agent.crawler_name = "TestBot".to_string();
    config.rate_limit.base_delay = 2.0;
    config.robots.timeout = 2;
    config
}

fn create_checker(config: &Config) -> ComplianceChecker {
    ComplianceChecker::new(Client::new(), config)
}

#[tokio::test]
async fn test_robots_rules_applied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "User-agent: *\nDisallow: /private\n\nUser-agent: TestBot\nDisallow: /search\nCrawl-delay: 4",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let checker = create_checker(&create_test_config());

    let denied = checker
        .check(&format!("{}/search?q=acme", server.uri()))
        .await;
    assert!(!denied.allowed);
    assert_eq!(denied.source, ComplianceSource::RobotsTxt);
    assert_eq!(denied.crawl_delay, Some(4.0));
    assert_eq!(
        denied.disallow_paths,
        vec!["/private".to_string(), "/search".to_string()]
    );

    // Generic rules still apply after the specific group
    let private = checker.check(&format!("{}/private/x", server.uri())).await;
    assert!(!private.allowed);

    let public = checker.check(&format!("{}/public", server.uri())).await;
    assert!(public.allowed);

    // One origin, one robots.txt request
    assert_eq!(checker.cached_origins(), 1);
}

#[tokio::test]
async fn test_missing_robots_allows_everything() {
    let server = MockServer::start().await;

    let checker = create_checker(&create_test_config());
    let result = checker.check(&format!("{}/anything", server.uri())).await;

    assert!(result.allowed);
    assert_eq!(result.crawl_delay, None);
    assert!(result.disallow_paths.is_empty());
    assert_eq!(result.source, ComplianceSource::FetchErrorFallback);
    assert_eq!(result.status_code, Some(404));
}

#[tokio::test]
async fn test_empty_robots_allows_everything() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    let checker = create_checker(&create_test_config());
    let result = checker.check(&format!("{}/x", server.uri())).await;
    assert!(result.allowed);
    assert_eq!(result.crawl_delay, None);
    assert_eq!(result.source, ComplianceSource::RobotsTxt);
}

#[tokio::test]
async fn test_failed_lookup_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let checker = create_checker(&create_test_config());
    for page in ["/a", "/b", "/c"] {
        let result = checker.check(&format!("{}{}", server.uri(), page)).await;
        assert!(result.allowed);
        assert_eq!(result.status_code, Some(503));
    }
}

#[tokio::test]
async fn test_disabled_robots_checking_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.robots.enabled = false;
    let checker = create_checker(&config);

    let result = checker.check(&format!("{}/x", server.uri())).await;
    assert!(result.allowed);
    assert_eq!(result.source, ComplianceSource::Skipped);
}

#[tokio::test]
async fn test_comprehensive_check_warnings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\nDisallow: /company\nCrawl-delay: 10"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/company/acme"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>No links</body></html>"),
        )
        .mount(&server)
        .await;

    let checker = create_checker(&create_test_config());
    let report = checker
        .comprehensive_check(&format!("{}/company/acme", server.uri()))
        .await;

    assert!(!report.overall_allowed);
    assert_eq!(report.recommended_delay, 10.0);
    assert!(!report.terms.has_tos_links);
    assert_eq!(
        report.warnings,
        vec![
            "Scraping not allowed by robots.txt".to_string(),
            "No obvious terms of service links found".to_string(),
            "High crawl delay: 10s".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_comprehensive_check_clean_site() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><title>Home</title></head>
               <body><a href="/terms">Terms</a><a href="/privacy">Privacy</a></body></html>"#,
        ))
        .mount(&server)
        .await;

    let checker = create_checker(&create_test_config());
    let report = checker
        .comprehensive_check(&format!("{}/", server.uri()))
        .await;

    assert!(report.overall_allowed);
    assert!(report.warnings.is_empty());
    assert_eq!(report.recommended_delay, 2.0);
    assert_eq!(report.terms.page_title.as_deref(), Some("Home"));
    assert_eq!(
        report.terms.tos_links,
        vec![
            format!("{}/terms", server.uri()),
            format!("{}/privacy", server.uri()),
        ]
    );
}

#[tokio::test]
async fn test_tos_check_on_error_page() {
    let server = MockServer::start().await;

    let checker = create_checker(&create_test_config());
    let terms = checker.check_tos(&format!("{}/missing", server.uri())).await;
    assert!(!terms.has_tos_links);
    assert_eq!(terms.status_code, Some(404));
}
