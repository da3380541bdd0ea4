//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsFetch};
pub use parser::{ParsedRobots, Rule};

use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Builds the robots.txt URL for an origin such as `https://example.com`
pub fn robots_url(origin: &str) -> String {
    format!("{}/robots.txt", origin.trim_end_matches('/'))
}

/// Fetches robots.txt for an origin
///
/// Never fails: a non-200 answer or a network error is reported through the
/// returned [`RobotsFetch`] so the caller can apply its fail-open policy.
///
/// # Arguments
///
/// * `client` - The HTTP client to use (carries our User-Agent)
/// * `origin` - Scheme, host and port, e.g. `https://example.com`
/// * `timeout` - Timeout for this single request
pub async fn fetch_robots(client: &Client, origin: &str, timeout: Duration) -> CachedRobots {
    let url = robots_url(origin);
    tracing::info!("Checking robots.txt: {}", url);

    let fetch = match client.get(&url).timeout(timeout).send().await {
        Ok(response) if response.status() == StatusCode::OK => match response.text().await {
            Ok(body) => RobotsFetch::Fetched(ParsedRobots::from_content(&body)),
            Err(e) => {
                tracing::warn!("Error reading robots.txt body from {}: {}", url, e);
                RobotsFetch::Unreachable {
                    error: e.to_string(),
                }
            }
        },
        Ok(response) => {
            tracing::warn!("robots.txt not accessible: {}", response.status().as_u16());
            RobotsFetch::Missing {
                status_code: response.status().as_u16(),
            }
        }
        Err(e) => {
            tracing::warn!("Error checking robots.txt {}: {}", url, e);
            RobotsFetch::Unreachable {
                error: e.to_string(),
            }
        }
    };

    CachedRobots::new(url, fetch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_robots_url() {
        assert_eq!(
            robots_url("https://example.com"),
            "https://example.com/robots.txt"
        );
        assert_eq!(
            robots_url("http://127.0.0.1:8080/"),
            "http://127.0.0.1:8080/robots.txt"
        );
    }
}
