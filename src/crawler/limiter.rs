//! Rate limiter for outbound requests
//!
//! Combines three politeness rules:
//! - a sliding window capping requests per `time_window`
//! - a humanized minimum gap (`base_delay` plus random jitter) between requests
//! - exponential backoff with jitter for retries
//!
//! It also answers whether the target sites are inside "courtesy hours".

use crate::config::RateLimitConfig;
use crate::state::RateLimiterState;
use chrono::{DateTime, FixedOffset, Timelike, Utc};
use rand::Rng;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Shared, serialized rate limiter
///
/// Built once per session and handed around as `Arc<RateLimiter>`. The state
/// mutex is held for the whole of [`RateLimiter::acquire`], so concurrent
/// callers queue up behind each other and the window cap holds.
#[derive(Debug)]
pub struct RateLimiter {
    state: Mutex<RateLimiterState>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Creates a limiter from the `[rate-limit]` configuration section
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            state: Mutex::new(RateLimiterState::new(
                config.max_requests,
                config.time_window(),
                config.base_delay(),
            )),
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Base delay between consecutive requests
    pub fn base_delay(&self) -> Duration {
        self.config.base_delay()
    }

    /// Waits until the next request may be sent, then records it
    ///
    /// # Algorithm
    ///
    /// 1. Prune timestamps older than `time_window`
    /// 2. If the window is full, sleep until its oldest entry expires
    /// 3. Sleep `base_delay + uniform(jitter_min, jitter_max)`
    /// 4. Record the post-wait instant
    ///
    /// # Returns
    ///
    /// The instant recorded for this request
    pub async fn acquire(&self) -> Instant {
        let mut state = self.state.lock().await;

        while let Some(wait) = state.window_wait(Instant::now()) {
            tracing::info!(
                "Rate limit reached ({} requests in {:.0}s window), waiting {:.1}s",
                state.max_requests,
                state.time_window.as_secs_f64(),
                wait.as_secs_f64()
            );
            sleep(wait).await;
        }

        let delay = state.base_delay + self.jitter();
        tracing::debug!("Waiting {:.2}s before next request", delay.as_secs_f64());
        sleep(delay).await;

        let now = Instant::now();
        state.prune(now);
        state.record(now);
        now
    }

    fn jitter(&self) -> Duration {
        let (min, max) = (self.config.jitter_min, self.config.jitter_max);
        if max <= min {
            return Duration::from_secs_f64(min);
        }
        Duration::from_secs_f64(rand::thread_rng().gen_range(min..=max))
    }

    /// Sleeps for an exponential backoff interval if retries remain
    ///
    /// # Arguments
    ///
    /// * `attempt` - Zero-based number of the attempt that just failed
    /// * `max_retries` - Attempt budget for the request
    ///
    /// # Returns
    ///
    /// * `false` - `attempt >= max_retries`, nothing was slept
    /// * `true` - Slept `min(unit * 2^attempt, cap) * (1 + 0.1 * uniform(0, 1))`
    pub async fn backoff(&self, attempt: u32, max_retries: u32) -> bool {
        if attempt >= max_retries {
            return false;
        }

        let jitter_fraction: f64 = rand::thread_rng().gen();
        let delay = self.backoff_delay(attempt, jitter_fraction);
        tracing::info!(
            "Backoff: waiting {:.2}s (attempt {})",
            delay.as_secs_f64(),
            attempt + 1
        );
        sleep(delay).await;
        true
    }

    /// Backoff interval for `attempt` with a jitter fraction in `[0, 1]`
    pub fn backoff_delay(&self, attempt: u32, jitter_fraction: f64) -> Duration {
        let exponential = self.config.backoff_unit * 2f64.powi(attempt.min(63) as i32);
        let capped = exponential.min(self.config.backoff_cap);
        Duration::from_secs_f64(capped * (1.0 + 0.1 * jitter_fraction.clamp(0.0, 1.0)))
    }

    /// Whether it is currently courtesy hours at the target sites
    pub fn is_courtesy_hours(&self) -> bool {
        self.is_courtesy_hours_at(Utc::now())
    }

    /// Whether `now` falls inside courtesy hours at the configured offset
    pub fn is_courtesy_hours_at(&self, now: DateTime<Utc>) -> bool {
        local_hour_at(now, self.config.courtesy_utc_offset).map_or(true, |hour| {
            is_courtesy_hour(
                hour,
                self.config.courtesy_start_hour,
                self.config.courtesy_end_hour,
            )
        })
    }

    /// Sleeps in one-hour steps until courtesy hours begin
    pub async fn wait_for_courtesy_hours(&self) {
        while !self.is_courtesy_hours() {
            tracing::warn!("Outside courtesy hours. Waiting 1 hour...");
            sleep(Duration::from_secs(3600)).await;
        }
    }

    /// Time since the last recorded request, `None` before the first one
    pub async fn time_since_last_request(&self) -> Option<Duration> {
        let state = self.state.lock().await;
        state
            .last_request_time
            .map(|last| Instant::now().saturating_duration_since(last))
    }

    /// Number of requests inside the current window
    pub async fn requests_in_window(&self) -> usize {
        let mut state = self.state.lock().await;
        state.prune(Instant::now());
        state.requests_in_window()
    }
}

/// Inclusive hour range check
pub fn is_courtesy_hour(hour: u32, start: u32, end: u32) -> bool {
    (start..=end).contains(&hour)
}

/// Local hour for a fixed UTC offset in hours (no DST)
pub fn local_hour_at(now: DateTime<Utc>, utc_offset_hours: i32) -> Option<u32> {
    let offset = FixedOffset::east_opt(utc_offset_hours * 3600)?;
    Some(now.with_timezone(&offset).hour())
}
