//! Robots.txt caching implementation
//!
//! One entry per origin, including failed lookups, so a session fetches each
//! robots.txt at most once per 24 hours.

use crate::robots::ParsedRobots;
use chrono::{DateTime, Duration, Utc};

/// How a cached entry was obtained
#[derive(Debug, Clone, PartialEq)]
pub enum RobotsFetch {
    /// robots.txt was fetched with HTTP 200
    Fetched(ParsedRobots),

    /// robots.txt answered with a non-200 status
    Missing { status_code: u16 },

    /// robots.txt could not be fetched at all
    Unreachable { error: String },
}

/// Cached robots.txt data for an origin
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// Absolute URL of the robots.txt file
    pub robots_url: String,

    /// Outcome of the fetch
    pub fetch: RobotsFetch,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    /// Creates a new CachedRobots instance stamped with the current time
    pub fn new(robots_url: impl Into<String>, fetch: RobotsFetch) -> Self {
        Self {
            robots_url: robots_url.into(),
            fetch,
            fetched_at: Utc::now(),
        }
    }

    /// Checks if the cached robots.txt is stale (older than 24 hours)
    pub fn is_stale(&self) -> bool {
        self.age() > Duration::hours(24)
    }

    /// Returns the age of the cached robots.txt
    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }
}
