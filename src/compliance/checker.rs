use crate::compliance::tos::{find_tos_links, TosResult};
use crate::config::Config;
use crate::robots::{fetch_robots, CachedRobots, RobotsFetch};
use crate::url::{origin_of, parse_target_url};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Where a compliance decision came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceSource {
    /// robots.txt was fetched and evaluated
    RobotsTxt,
    /// robots.txt was missing or unreachable; allowed by default
    FetchErrorFallback,
    /// robots.txt checking is disabled
    Skipped,
}

/// Robots.txt decision for one URL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceResult {
    pub allowed: bool,
    /// Seconds requested by `Crawl-delay`
    pub crawl_delay: Option<f64>,
    pub disallow_paths: Vec<String>,
    pub source: ComplianceSource,
    pub robots_url: Option<String>,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

impl ComplianceResult {
    fn permissive(source: ComplianceSource) -> Self {
        Self {
            allowed: true,
            crawl_delay: None,
            disallow_paths: Vec::new(),
            source,
            robots_url: None,
            status_code: None,
            error: None,
        }
    }

    fn from_cached(cached: &CachedRobots, path: &str, agent: &str) -> Self {
        let mut result = Self::permissive(ComplianceSource::FetchErrorFallback);
        result.robots_url = Some(cached.robots_url.clone());

        match &cached.fetch {
            RobotsFetch::Fetched(robots) => {
                result.source = ComplianceSource::RobotsTxt;
                result.allowed = robots.is_allowed(path, agent);
                result.crawl_delay = robots.crawl_delay(agent);
                result.disallow_paths = robots.disallow_paths().to_vec();
                result.status_code = Some(StatusCode::OK.as_u16());
            }
            RobotsFetch::Missing { status_code } => {
                result.status_code = Some(*status_code);
            }
            RobotsFetch::Unreachable { error } => {
                result.error = Some(error.clone());
            }
        }

        result
    }

    /// Crawl delay as a `Duration`, if one was requested
    pub fn crawl_delay_duration(&self) -> Option<Duration> {
        self.crawl_delay
            .and_then(|d| Duration::try_from_secs_f64(d).ok())
    }
}

/// Combined robots.txt and ToS report
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    pub url: String,
    pub checked_at: DateTime<Utc>,
    pub robots: ComplianceResult,
    pub terms: TosResult,
    pub overall_allowed: bool,
    /// Seconds to wait between requests to this site
    pub recommended_delay: f64,
    pub warnings: Vec<String>,
}

/// Decides whether URLs may be fetched
///
/// Robots.txt lookups are cached per origin for the session, including
/// missing and unreachable files. Lookup failures never reach the caller:
/// they fall back to "allowed, no crawl delay" and are logged at warn level.
#[derive(Debug)]
pub struct ComplianceChecker {
    client: Client,
    agent: String,
    enabled: bool,
    timeout: Duration,
    base_delay: f64,
    high_delay_warning: f64,
    cache: Mutex<HashMap<String, CachedRobots>>,
}

impl ComplianceChecker {
    /// Creates a checker that shares the session's HTTP client
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            agent: config.user_agent.crawler_name.clone(),
            enabled: config.robots.enabled,
            timeout: config.robots.timeout(),
            base_delay: config.rate_limit.base_delay,
            high_delay_warning: config.robots.high_delay_warning,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Agent token matched against robots.txt `User-agent` lines
    pub fn agent(&self) -> &str {
        &self.agent
    }

    /// Checks robots.txt for a URL
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL about to be fetched
    ///
    /// # Returns
    ///
    /// The decision; lookup failures produce an allowed
    /// [`ComplianceSource::FetchErrorFallback`] result with the error recorded.
    pub async fn check(&self, url: &str) -> ComplianceResult {
        if !self.enabled {
            return ComplianceResult::permissive(ComplianceSource::Skipped);
        }

        let parsed = match parse_target_url(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Cannot check robots.txt for {}: {}", url, e);
                let mut result = ComplianceResult::permissive(ComplianceSource::FetchErrorFallback);
                result.error = Some(e.to_string());
                return result;
            }
        };

        let Some(origin) = origin_of(&parsed) else {
            return ComplianceResult::permissive(ComplianceSource::FetchErrorFallback);
        };

        let path = match parsed.query() {
            Some(query) => format!("{}?{}", parsed.path(), query),
            None => parsed.path().to_string(),
        };

        let cached = self.robots_for(&origin).await;
        let result = ComplianceResult::from_cached(&cached, &path, &self.agent);

        if !result.allowed {
            tracing::warn!("Scraping not allowed for: {}", url);
        } else {
            tracing::debug!("Scraping allowed for: {}", url);
        }
        if let Some(delay) = result.crawl_delay {
            tracing::info!("Crawl delay found: {}s", delay);
        }

        result
    }

    async fn robots_for(&self, origin: &str) -> CachedRobots {
        if let Some(cached) = self.cached(origin) {
            return cached;
        }

        let fetched = fetch_robots(&self.client, origin, self.timeout).await;
        self.lock_cache()
            .insert(origin.to_string(), fetched.clone());
        fetched
    }

    fn cached(&self, origin: &str) -> Option<CachedRobots> {
        self.lock_cache()
            .get(origin)
            .filter(|cached| !cached.is_stale())
            .cloned()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, CachedRobots>> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of origins with a cached robots.txt lookup
    pub fn cached_origins(&self) -> usize {
        self.lock_cache().len()
    }

    /// Scans the page itself for links to terms of service
    pub async fn check_tos(&self, url: &str) -> TosResult {
        let parsed = match parse_target_url(url) {
            Ok(parsed) => parsed,
            Err(e) => return TosResult::failed(None, Some(e.to_string())),
        };
        let Some(base) = origin_of(&parsed).and_then(|o| url::Url::parse(&o).ok()) else {
            return TosResult::failed(None, None);
        };

        let response = match self.client.get(url).timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Error checking ToS: {}", e);
                return TosResult::failed(None, Some(e.to_string()));
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!("ToS check for {} returned HTTP {}", url, status.as_u16());
            return TosResult::failed(Some(status.as_u16()), None);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Error checking ToS: {}", e);
                return TosResult::failed(Some(status.as_u16()), Some(e.to_string()));
            }
        };

        let (tos_links, page_title) = find_tos_links(&body, &base);
        TosResult {
            has_tos_links: !tos_links.is_empty(),
            tos_links,
            page_title,
            status_code: Some(status.as_u16()),
            error: None,
        }
    }

    /// Runs both the robots.txt and the ToS check and derives warnings
    pub async fn comprehensive_check(&self, url: &str) -> ComplianceReport {
        tracing::info!("Comprehensive check for: {}", url);

        let robots = self.check(url).await;
        let terms = self.check_tos(url).await;

        let mut warnings = Vec::new();
        if !robots.allowed {
            warnings.push("Scraping not allowed by robots.txt".to_string());
        }
        if !terms.has_tos_links {
            warnings.push("No obvious terms of service links found".to_string());
        }
        if let Some(delay) = robots.crawl_delay.filter(|d| *d > self.high_delay_warning) {
            warnings.push(format!("High crawl delay: {}s", delay));
        }

        ComplianceReport {
            url: url.to_string(),
            checked_at: Utc::now(),
            overall_allowed: robots.allowed,
            recommended_delay: robots.crawl_delay.unwrap_or(self.base_delay),
            robots,
            terms,
            warnings,
        }
    }
}
