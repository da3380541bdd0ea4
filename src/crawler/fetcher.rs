//! HTTP fetcher implementation
//!
//! This module handles the single-attempt side of fetching:
//! - Building the HTTP client with the identifying user agent
//! - One GET per call, classified into a [`FetchResult`]
//!
//! Retries, waits and metrics live in the pipeline.

use crate::config::Config;
use crate::TransportKind;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, RETRY_AFTER};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Result of a single fetch attempt
#[derive(Debug)]
pub enum FetchResult {
    /// Server answered 200
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Raw response body
        body: Vec<u8>,
    },

    /// Server answered 429
    RateLimited {
        status_code: u16,
        /// Parsed `Retry-After` header, if it held whole seconds
        retry_after: Option<Duration>,
    },

    /// Any other status
    HttpError { status_code: u16 },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        kind: TransportKind,
        /// Error description
        error: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The scraper configuration (user agent and HTTP sections)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use founders_scraper::config::Config;
/// use founders_scraper::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    if let Ok(language) = HeaderValue::from_str(&config.http.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, language);
    }

    Client::builder()
        // Format: CrawlerName/Version (+ContactURL; ContactEmail)
        .user_agent(config.user_agent.header_value())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.http.read_timeout))
        .connect_timeout(Duration::from_secs(config.http.connect_timeout))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL once
///
/// # Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 200 | `Success` with the body bytes |
/// | HTTP 429 | `RateLimited` with `Retry-After` seconds if present |
/// | Any other status | `HttpError` |
/// | Send or body read failure | `NetworkError` with its [`TransportKind`] |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchResult::NetworkError {
                kind: TransportKind::classify(&e),
                error: e.to_string(),
            }
        }
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return FetchResult::RateLimited {
            status_code: status.as_u16(),
            retry_after: parse_retry_after(response.headers()),
        };
    }

    if status != StatusCode::OK {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    match response.bytes().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body: body.to_vec(),
        },
        Err(e) => FetchResult::NetworkError {
            kind: match TransportKind::classify(&e) {
                TransportKind::Request => TransportKind::Body,
                kind => kind,
            },
            error: e.to_string(),
        },
    }
}

/// Reads a `Retry-After` header given in seconds
///
/// HTTP-date values are not interpreted and yield `None`.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
