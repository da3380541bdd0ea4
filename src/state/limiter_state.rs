use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Sliding-window bookkeeping for the rate limiter
///
/// Holds the timestamps of requests issued inside the trailing `time_window`,
/// oldest first. The limiter mutates it under exclusive access; nothing here
/// sleeps.
#[derive(Debug, Clone)]
pub struct RateLimiterState {
    /// Request timestamps inside the trailing window, oldest first
    recent_request_timestamps: VecDeque<Instant>,

    /// Maximum number of requests in any trailing window
    pub max_requests: u32,

    /// Length of the sliding window
    pub time_window: Duration,

    /// Minimum delay between consecutive requests (before jitter)
    pub base_delay: Duration,

    /// When the most recent request was recorded
    pub last_request_time: Option<Instant>,
}

impl RateLimiterState {
    /// Creates an empty state
    pub fn new(max_requests: u32, time_window: Duration, base_delay: Duration) -> Self {
        Self {
            recent_request_timestamps: VecDeque::with_capacity(max_requests as usize),
            max_requests,
            time_window,
            base_delay,
            last_request_time: None,
        }
    }

    /// Drops timestamps that have left the trailing window
    pub fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.recent_request_timestamps.front() {
            if now.saturating_duration_since(oldest) >= self.time_window {
                self.recent_request_timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// How long to wait before the window has room for another request
    ///
    /// Prunes first. Returns `None` when a request may be issued now.
    ///
    /// # Arguments
    ///
    /// * `now` - The current time instant
    ///
    /// # Returns
    ///
    /// * `None` - Fewer than `max_requests` requests in the window
    /// * `Some(wait)` - Time until the oldest request leaves the window
    pub fn window_wait(&mut self, now: Instant) -> Option<Duration> {
        self.prune(now);

        if self.recent_request_timestamps.len() < self.max_requests as usize {
            return None;
        }

        let oldest = *self.recent_request_timestamps.front()?;
        let age = now.saturating_duration_since(oldest);
        Some(self.time_window.saturating_sub(age))
    }

    /// Records a request issued at `now`
    pub fn record(&mut self, now: Instant) {
        self.recent_request_timestamps.push_back(now);
        self.last_request_time = Some(now);
    }

    /// Number of requests currently inside the window (as of the last prune)
    pub fn requests_in_window(&self) -> usize {
        self.recent_request_timestamps.len()
    }
}
