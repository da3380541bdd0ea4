//! Session metrics for the fetch pipeline

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Counters {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    rate_limit_hits: u64,
    records_extracted: u64,
    error_types: BTreeMap<String, u64>,
}

/// Request counters for one scraping session
///
/// Shared between the pipeline and the CLI through an `Arc`. Every counter
/// only grows, and `total_requests == successful_requests + failed_requests`
/// holds after every call to [`ScrapingMetrics::record`].
#[derive(Debug)]
pub struct ScrapingMetrics {
    counters: Mutex<Counters>,
    start: Instant,
    started_at: DateTime<Utc>,
}

/// Point-in-time view of [`ScrapingMetrics`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub rate_limit_hits: u64,
    pub records_extracted: u64,
    pub error_types: BTreeMap<String, u64>,
    pub started_at: DateTime<Utc>,
    pub elapsed_minutes: f64,
    /// Percentage in `[0, 100]`; 0 when nothing was requested
    pub success_rate: f64,
    /// 0 when no time has elapsed
    pub requests_per_minute: f64,
}

impl ScrapingMetrics {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(Counters::default()),
            start: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Records the outcome of one HTTP attempt
    ///
    /// # Arguments
    ///
    /// * `success` - Whether the attempt produced a usable page
    /// * `error_kind` - Label counted under `error_types`, only on failure
    /// * `rate_limited` - Whether the server answered 429
    pub fn record(&self, success: bool, error_kind: Option<&str>, rate_limited: bool) {
        let mut counters = self.lock();
        counters.total_requests += 1;

        if success {
            counters.successful_requests += 1;
        } else {
            counters.failed_requests += 1;
            if let Some(kind) = error_kind {
                *counters.error_types.entry(kind.to_string()).or_insert(0) += 1;
            }
        }

        if rate_limited {
            counters.rate_limit_hits += 1;
        }
    }

    /// Counts one extracted record
    pub fn record_extraction(&self) {
        self.lock().records_extracted += 1;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.snapshot_with_elapsed(self.start.elapsed())
    }

    fn snapshot_with_elapsed(&self, elapsed: Duration) -> MetricsSnapshot {
        let counters = self.lock();
        let elapsed_minutes = elapsed.as_secs_f64() / 60.0;

        let success_rate = if counters.total_requests == 0 {
            0.0
        } else {
            counters.successful_requests as f64 / counters.total_requests as f64 * 100.0
        };

        let requests_per_minute = if elapsed_minutes > 0.0 {
            counters.total_requests as f64 / elapsed_minutes
        } else {
            0.0
        };

        MetricsSnapshot {
            total_requests: counters.total_requests,
            successful_requests: counters.successful_requests,
            failed_requests: counters.failed_requests,
            rate_limit_hits: counters.rate_limit_hits,
            records_extracted: counters.records_extracted,
            error_types: counters.error_types.clone(),
            started_at: self.started_at,
            elapsed_minutes,
            success_rate,
            requests_per_minute,
        }
    }

    /// Human-readable status, one `(field, value)` pair per line of output
    pub fn status_report(&self) -> Vec<(&'static str, String)> {
        self.snapshot().status_report()
    }

    /// Logs a one-line summary at info level
    pub fn log_status(&self) {
        let s = self.snapshot();
        tracing::info!(
            "Requests: {} total, {} ok, {} failed ({:.1}% success), {} rate-limited, {} records, {:.2} req/min",
            s.total_requests,
            s.successful_requests,
            s.failed_requests,
            s.success_rate,
            s.rate_limit_hits,
            s.records_extracted,
            s.requests_per_minute
        );
    }

    // Counters stay usable after a poisoned lock
    fn lock(&self) -> std::sync::MutexGuard<'_, Counters> {
        self.counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ScrapingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSnapshot {
    pub fn status_report(&self) -> Vec<(&'static str, String)> {
        let error_types = if self.error_types.is_empty() {
            "none".to_string()
        } else {
            self.error_types
                .iter()
                .map(|(kind, count)| format!("{}={}", kind, count))
                .collect::<Vec<_>>()
                .join(", ")
        };

        vec![
            ("total_requests", self.total_requests.to_string()),
            ("successful_requests", self.successful_requests.to_string()),
            ("failed_requests", self.failed_requests.to_string()),
            ("success_rate", format!("{:.1}%", self.success_rate)),
            ("requests_per_minute", format!("{:.2}", self.requests_per_minute)),
            ("rate_limit_hits", self.rate_limit_hits.to_string()),
            ("elapsed_minutes", format!("{:.1}", self.elapsed_minutes)),
            ("records_extracted", self.records_extracted.to_string()),
            ("error_types", error_types),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metrics() {
        let metrics = ScrapingMetrics::new();
        let snapshot = metrics.snapshot_with_elapsed(Duration::ZERO);
        assert_eq!(snapshot.total_requests, 0);
        assert_eq!(snapshot.success_rate, 0.0);
        assert_eq!(snapshot.requests_per_minute, 0.0);
    }

    #[test]
    fn test_success_rate_and_totals() {
        let metrics = ScrapingMetrics::new();
        for _ in 0..7 {
            metrics.record(true, None, false);
        }
        for _ in 0..3 {
            metrics.record(false, Some("http_500"), false);
        }

        let s = metrics.snapshot();
        assert_eq!(s.total_requests, 10);
        assert_eq!(s.total_requests, s.successful_requests + s.failed_requests);
        assert!((s.success_rate - 70.0).abs() < 1e-9);
        assert_eq!(s.error_types.get("http_500"), Some(&3));
    }

    #[test]
    fn test_error_kind_ignored_on_success() {
        let metrics = ScrapingMetrics::new();
        metrics.record(true, Some("timeout"), false);
        assert!(metrics.snapshot().error_types.is_empty());
    }

    #[test]
    fn test_rate_limit_hits_and_extractions() {
        let metrics = ScrapingMetrics::new();
        metrics.record(false, Some("http_429"), true);
        metrics.record(true, None, false);
        metrics.record_extraction();

        let s = metrics.snapshot();
        assert_eq!(s.rate_limit_hits, 1);
        assert_eq!(s.records_extracted, 1);
        assert_eq!(s.failed_requests, 1);
    }

    #[test]
    fn test_requests_per_minute() {
        let metrics = ScrapingMetrics::new();
        for _ in 0..6 {
            metrics.record(true, None, false);
        }
        let s = metrics.snapshot_with_elapsed(Duration::from_secs(120));
        assert!((s.requests_per_minute - 3.0).abs() < 1e-9);
        assert!((s.elapsed_minutes - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_status_report_order_and_format() {
        let metrics = ScrapingMetrics::new();
        metrics.record(true, None, false);
        metrics.record(false, Some("connect"), false);

        let report = metrics.status_report();
        let fields: Vec<&str> = report.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            fields,
            vec![
                "total_requests",
                "successful_requests",
                "failed_requests",
                "success_rate",
                "requests_per_minute",
                "rate_limit_hits",
                "elapsed_minutes",
                "records_extracted",
                "error_types",
            ]
        );
        assert_eq!(report[3].1, "50.0%");
        assert_eq!(report[8].1, "connect=1");
    }
}
