//! Console output for session status and batch results

use crate::compliance::ComplianceReport;
use crate::crawler::{RateLimiter, ScrapeOutcome};
use crate::state::MetricsSnapshot;

/// Turns `snake_case` field names into `Title Case` labels
fn title_case(field: &str) -> String {
    field
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Prints the metrics report, the limiter window and the courtesy-hours status
pub async fn print_status(snapshot: &MetricsSnapshot, limiter: &RateLimiter) {
    println!("=== Scraper Status ===\n");

    println!("Performance:");
    for (field, value) in snapshot.status_report() {
        println!("  {}: {}", title_case(field), value);
    }
    println!();

    let config = limiter.config();
    println!("Rate Limiter:");
    println!(
        "  Requests in window: {}/{} ({}s window)",
        limiter.requests_in_window().await,
        config.max_requests,
        config.time_window
    );
    match limiter.time_since_last_request().await {
        Some(since) => println!("  Last request: {:.1}s ago", since.as_secs_f64()),
        None => println!("  Last request: none this session"),
    }
    println!();

    println!("Courtesy Hours Check:");
    if limiter.is_courtesy_hours() {
        println!("  Current status: Active hours");
    } else {
        println!("  Current status: Off hours");
        println!(
            "  Scraping resumes at {}:00 (UTC{:+})",
            config.courtesy_start_hour, config.courtesy_utc_offset
        );
    }
}

/// Prints a compliance report
pub fn print_compliance(report: &ComplianceReport) {
    println!("URL: {}", report.url);
    println!("Allowed: {}", report.overall_allowed);
    println!("Recommended delay: {}s", report.recommended_delay);
    if let Some(robots_url) = &report.robots.robots_url {
        println!("robots.txt: {}", robots_url);
    }
    if !report.robots.disallow_paths.is_empty() {
        println!("Disallowed paths ({}):", report.robots.disallow_paths.len());
        for path in &report.robots.disallow_paths {
            println!("  - {}", path);
        }
    }
    if !report.terms.tos_links.is_empty() {
        println!("Terms links:");
        for link in &report.terms.tos_links {
            println!("  - {}", link);
        }
    }

    if !report.warnings.is_empty() {
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  - {}", warning);
        }
    }
}

/// Prints the summary of a batch scrape, including a quick quality check
pub fn print_batch_summary(outcome: &ScrapeOutcome) {
    println!("=== Batch Complete ===\n");
    println!("Successful: {}", outcome.records.len());
    println!("Errors: {}", outcome.failures.len());
    println!("Success rate: {:.1}%", outcome.success_rate());

    if outcome.records.is_empty() {
        return;
    }

    let total = outcome.records.len();
    let mut names: Vec<&str> = outcome.records.iter().map(|r| r.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    let with_website = outcome
        .records
        .iter()
        .filter(|r| !r.website.is_empty())
        .count();

    println!("\nQuality Check:");
    println!("  Unique companies: {}/{}", names.len(), total);
    println!(
        "  With website: {}/{} ({:.1}%)",
        with_website,
        total,
        with_website as f64 / total as f64 * 100.0
    );
}
