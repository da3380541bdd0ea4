//! Crawler module for polite page fetching
//!
//! This module contains the fetch side of the scraper:
//! - HTTP fetching, one classified attempt at a time
//! - Rate limiting, backoff and courtesy hours
//! - The compliance-gated retry pipeline
//! - Source-specific scraping on top of the pipeline

mod fetcher;
mod limiter;
mod pipeline;
mod scrape;

pub use fetcher::{build_http_client, fetch_url, parse_retry_after, FetchResult};
pub use limiter::{is_courtesy_hour, local_hour_at, RateLimiter};
pub use pipeline::{BatchOutcome, FetchPipeline, FetchedPage};
pub use scrape::{ScrapeOutcome, Scraper};
