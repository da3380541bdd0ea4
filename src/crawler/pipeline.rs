//! Compliance-gated, rate-limited fetch pipeline
//!
//! Every outbound page request goes through [`FetchPipeline::fetch`]:
//!
//! 1. Compliance gate (robots.txt)
//! 2. Crawl-delay wait, when the site asks for more than our base delay
//! 3. Rate limiter
//! 4. GET with bounded retries, recording every attempt in the metrics

use crate::compliance::ComplianceChecker;
use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchResult};
use crate::crawler::limiter::RateLimiter;
use crate::output::FailureRecord;
use crate::state::ScrapingMetrics;
use crate::{Result, ScraperError};
use reqwest::Client;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// A page fetched with HTTP 200
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL as requested
    pub url: String,
    /// URL after redirects
    pub final_url: String,
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Pages and failures of a batch run, in input order
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub pages: Vec<FetchedPage>,
    pub failures: Vec<FailureRecord>,
}

/// The fetch pipeline and the shared handles it drives
#[derive(Debug, Clone)]
pub struct FetchPipeline {
    client: Client,
    compliance: Arc<ComplianceChecker>,
    limiter: Arc<RateLimiter>,
    metrics: Arc<ScrapingMetrics>,
    max_retries: u32,
    default_retry_after: Duration,
}

impl FetchPipeline {
    /// Builds a pipeline with fresh collaborators from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_http_client(config)?;
        let compliance = Arc::new(ComplianceChecker::new(client.clone(), config));
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit));
        let metrics = Arc::new(ScrapingMetrics::new());

        Ok(Self::new(client, compliance, limiter, metrics, config))
    }

    /// Builds a pipeline around existing shared handles
    pub fn new(
        client: Client,
        compliance: Arc<ComplianceChecker>,
        limiter: Arc<RateLimiter>,
        metrics: Arc<ScrapingMetrics>,
        config: &Config,
    ) -> Self {
        Self {
            client,
            compliance,
            limiter,
            metrics,
            max_retries: config.rate_limit.max_retries,
            default_retry_after: config.rate_limit.default_retry_after(),
        }
    }

    pub fn compliance(&self) -> &Arc<ComplianceChecker> {
        &self.compliance
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn metrics(&self) -> &Arc<ScrapingMetrics> {
        &self.metrics
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Fetches a URL with the configured retry budget
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        self.fetch_with_retries(url, self.max_retries).await
    }

    /// Fetches a URL, making at most `max_retries` attempts
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 200 | Success |
    /// | HTTP 429 | Sleep `Retry-After` (default 60s) if attempts remain |
    /// | Other status | Next attempt, no extra wait |
    /// | Transport error | Exponential backoff, then next attempt |
    ///
    /// # Errors
    ///
    /// * `ComplianceDenied` - robots.txt disallows the URL; nothing was sent
    /// * `ExhaustedRetries` - every attempt failed; carries the last error
    pub async fn fetch_with_retries(&self, url: &str, max_retries: u32) -> Result<FetchedPage> {
        let compliance = self.compliance.check(url).await;
        if !compliance.allowed {
            return Err(ScraperError::ComplianceDenied {
                url: url.to_string(),
            });
        }

        if let Some(delay) = compliance.crawl_delay_duration() {
            if delay > self.limiter.base_delay() {
                tracing::info!("Respecting crawl delay: {:.1}s", delay.as_secs_f64());
                sleep(delay).await;
            }
        }

        self.limiter.acquire().await;

        let attempts = max_retries.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            tracing::debug!("Fetching {} (attempt {}/{})", url, attempt + 1, attempts);
            let remaining = attempt + 1 < attempts;

            match fetch_url(&self.client, url).await {
                FetchResult::Success {
                    final_url,
                    status_code,
                    body,
                } => {
                    self.metrics.record(true, None, false);
                    tracing::info!("Successfully fetched: {}", url);
                    return Ok(FetchedPage {
                        url: url.to_string(),
                        final_url,
                        status: status_code,
                        body,
                    });
                }
                FetchResult::RateLimited {
                    status_code,
                    retry_after,
                } => {
                    self.metrics
                        .record(false, Some(status_label(status_code).as_str()), true);
                    let wait = retry_after.unwrap_or(self.default_retry_after);
                    tracing::warn!("Rate limited by {}. Retry after {}s", url, wait.as_secs());
                    last_error = Some(ScraperError::RateLimited {
                        url: url.to_string(),
                        retry_after: wait,
                    });
                    if remaining {
                        sleep(wait).await;
                    }
                }
                FetchResult::HttpError { status_code } => {
                    self.metrics
                        .record(false, Some(status_label(status_code).as_str()), false);
                    tracing::warn!("HTTP {} for {}", status_code, url);
                    last_error = Some(ScraperError::HttpStatus {
                        url: url.to_string(),
                        status: status_code,
                    });
                }
                FetchResult::NetworkError { kind, error } => {
                    self.metrics.record(false, Some(kind.label()), false);
                    tracing::error!("Request failed for {}: {}", url, error);
                    let failure = ScraperError::Transport {
                        url: url.to_string(),
                        kind,
                        message: error,
                    };

                    if !remaining || !self.limiter.backoff(attempt, max_retries).await {
                        return Err(ScraperError::ExhaustedRetries {
                            url: url.to_string(),
                            attempts: attempt + 1,
                            last: Box::new(failure),
                        });
                    }
                    last_error = Some(failure);
                }
            }
        }

        let last = last_error.unwrap_or_else(|| ScraperError::HttpStatus {
            url: url.to_string(),
            status: 0,
        });
        Err(ScraperError::ExhaustedRetries {
            url: url.to_string(),
            attempts,
            last: Box::new(last),
        })
    }

    /// Fetches every URL in order; one failure never stops the batch
    pub async fn fetch_batch(&self, urls: &[String]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for (index, url) in urls.iter().enumerate() {
            tracing::info!("Processing URL {}/{}: {}", index + 1, urls.len(), url);

            match self.fetch(url).await {
                Ok(page) => outcome.pages.push(page),
                Err(e) => {
                    tracing::warn!("Failed to fetch {}: {}", url, e);
                    outcome.failures.push(FailureRecord::new(url, &e));
                }
            }
        }

        tracing::info!(
            "Batch complete: {} fetched, {} failed",
            outcome.pages.len(),
            outcome.failures.len()
        );
        outcome
    }
}

/// Metrics label for a failed HTTP status
fn status_label(status_code: u16) -> String {
    format!("http_{}", status_code)
}
