//! State module for tracking a scraping session
//!
//! # Components
//!
//! - `RateLimiterState`: Sliding window of recent request timestamps
//! - `ScrapingMetrics`: Shared request/extraction counters and derived rates

mod limiter_state;
mod metrics;

// Re-export main types
pub use limiter_state::RateLimiterState;
pub use metrics::{MetricsSnapshot, ScrapingMetrics};
