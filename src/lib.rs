//! founders-scraper: a polite startup-directory scraper
//!
//! This crate fetches company pages from a handful of known directories
//! (Crunchbase, AngelList, Product Hunt), gating every request on robots.txt,
//! a sliding-window rate limiter and bounded retries, and turns the pages it
//! is allowed to fetch into structured company records.

pub mod compliance;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod robots;
pub mod state;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Main error type for scraper operations
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scraping not allowed for {url}: disallowed by robots.txt")]
    ComplianceDenied { url: String },

    #[error("Rate limited by {url} (retry after {retry_after:?})")]
    RateLimited { url: String, retry_after: Duration },

    #[error("Transport error for {url} ({kind}): {message}")]
    Transport {
        url: String,
        kind: TransportKind,
        message: String,
    },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed after {attempts} attempts for {url}: {last}")]
    ExhaustedRetries {
        url: String,
        attempts: u32,
        last: Box<ScraperError>,
    },

    #[error("No extractor found for URL: {url}")]
    NoExtractor { url: String },

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ScraperError {
    /// Returns true if another attempt at the same URL could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Transport { .. } | Self::HttpStatus { .. }
        )
    }
}

/// Classification of transport-level failures, used as metrics labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    Timeout,
    Connect,
    Redirect,
    Body,
    Decode,
    Request,
}

impl TransportKind {
    /// Classifies a reqwest error
    pub fn classify(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connect
        } else if error.is_redirect() {
            Self::Redirect
        } else if error.is_body() {
            Self::Body
        } else if error.is_decode() {
            Self::Decode
        } else {
            Self::Request
        }
    }

    /// Label under which this kind is counted in the metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Redirect => "redirect",
            Self::Body => "body",
            Self::Decode => "decode",
            Self::Request => "request",
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL '{url}': {reason}")]
    Parse { url: String, reason: String },

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for scraper operations
pub type Result<T> = std::result::Result<T, ScraperError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use compliance::{ComplianceChecker, ComplianceReport, ComplianceResult, ComplianceSource};
pub use config::Config;
pub use crawler::{FetchPipeline, FetchedPage, RateLimiter, Scraper};
pub use extract::{CompanyRecord, SourceKind, SourceRegistry};
pub use output::FailureRecord;
pub use state::{MetricsSnapshot, RateLimiterState, ScrapingMetrics};
