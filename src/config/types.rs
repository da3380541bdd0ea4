use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure
///
/// Every section has defaults, so an empty file (or no file at all) yields the
/// production settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "rate-limit")]
    pub rate_limit: RateLimitConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub http: HttpConfig,
    pub robots: RobotsConfig,
    pub output: OutputConfig,
}

/// Rate limiting, retry and courtesy-hours configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RateLimitConfig {
    /// Maximum number of requests inside one time window
    pub max_requests: u32,

    /// Length of the sliding window (seconds)
    pub time_window: f64,

    /// Minimum delay before every request (seconds)
    pub base_delay: f64,

    /// Lower bound of the random delay added to `base_delay` (seconds)
    pub jitter_min: f64,

    /// Upper bound of the random delay added to `base_delay` (seconds)
    pub jitter_max: f64,

    /// Attempts per URL before giving up
    pub max_retries: u32,

    /// Multiplier applied to `2^attempt` when backing off (seconds)
    pub backoff_unit: f64,

    /// Ceiling for the un-jittered backoff delay (seconds)
    pub backoff_cap: f64,

    /// Wait used on HTTP 429 when the response has no usable Retry-After (seconds)
    pub default_retry_after: u64,

    /// Fixed UTC offset used for courtesy hours (hours)
    pub courtesy_utc_offset: i32,

    /// First local hour of the courtesy window
    pub courtesy_start_hour: u32,

    /// Last local hour of the courtesy window (inclusive)
    pub courtesy_end_hour: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            time_window: 60.0,
            base_delay: 2.0,
            jitter_min: 0.5,
            jitter_max: 1.5,
            max_retries: 3,
            backoff_unit: 1.0,
            backoff_cap: 60.0,
            default_retry_after: 60,
            courtesy_utc_offset: 1,
            courtesy_start_hour: 8,
            courtesy_end_hour: 18,
        }
    }
}

impl RateLimitConfig {
    pub fn time_window(&self) -> Duration {
        Duration::from_secs_f64(self.time_window)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_secs_f64(self.base_delay)
    }

    pub fn default_retry_after(&self) -> Duration {
        Duration::from_secs(self.default_retry_after)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler, also the token matched against robots.txt groups
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "founders25-research".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://universidad.edu/research".to_string(),
            contact_email: "research@universidad.edu".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Full User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// Connect timeout (seconds)
    pub connect_timeout: u64,

    /// Whole-request timeout for page fetches (seconds)
    pub read_timeout: u64,

    /// Value of the Accept-Language header
    pub accept_language: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: 10,
            read_timeout: 30,
            accept_language: "es-ES,es;q=0.8,en-US;q=0.5,en;q=0.3".to_string(),
        }
    }
}

/// robots.txt and terms-of-service checking
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RobotsConfig {
    /// When false every URL is allowed without fetching robots.txt
    pub enabled: bool,

    /// Timeout for robots.txt and ToS page fetches (seconds)
    pub timeout: u64,

    /// Crawl delays above this produce a warning (seconds)
    pub high_delay_warning: f64,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: 10,
            high_delay_warning: 5.0,
        }
    }
}

impl RobotsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Output directories
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Single-scrape results and the sample URL file
    pub data_dir: String,

    /// QA reports
    pub logs_dir: String,

    /// Batch results and errors
    pub exports_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            logs_dir: "logs".to_string(),
            exports_dir: "exports".to_string(),
        }
    }
}
