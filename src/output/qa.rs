//! Data-quality report over harvested records
//!
//! Works on plain JSON objects so exports from older runs (which may carry
//! extra fields such as `founded_year` or `industry`) can be checked too.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::output::export::{timestamped_path, write_json};
use crate::Result;

const REQUIRED_FIELDS: [&str; 5] = ["id", "name", "website", "source", "scraped_at"];
const OPTIONAL_FIELDS: [&str; 4] = ["description", "founded_year", "location", "industry"];

/// Errors listed in the markdown report before eliding the rest
const REPORT_MAX_ERRORS: usize = 10;
/// Duplicates listed in the markdown report before eliding the rest
const REPORT_MAX_DUPLICATES: usize = 5;

/// Validation problems of one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordErrors {
    pub record_index: usize,
    pub record_id: String,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletenessStats {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub records_above_70_percent: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationSummary {
    pub total_records: usize,
    pub valid_records: usize,
    pub invalid_records: usize,
    pub validation_errors: Vec<RecordErrors>,
    pub completeness_stats: Option<CompletenessStats>,
}

/// Everything the QA pipeline found, saved next to the markdown report
#[derive(Debug, Clone, Serialize)]
pub struct QaResults {
    pub validation: ValidationSummary,
    pub duplicates: Vec<Value>,
    pub timestamp: DateTime<Utc>,
}

/// A field counts as present when it is not null, empty, zero or false
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

fn field_str<'a>(record: &'a Value, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Weighted share of populated fields
///
/// Required fields carry 70% of the score, optional ones 30%. A record that
/// is not a non-empty JSON object scores 0.
pub fn completeness_score(record: &Value) -> f64 {
    match record.as_object() {
        Some(object) if !object.is_empty() => {}
        _ => return 0.0,
    }

    let share = |fields: &[&str]| {
        let present = fields.iter().filter(|f| is_present(record.get(**f))).count();
        present as f64 / fields.len() as f64
    };

    share(&REQUIRED_FIELDS) * 0.7 + share(&OPTIONAL_FIELDS) * 0.3
}

/// Records whose `id` was already seen earlier in the list
pub fn detect_exact_duplicates(records: &[Value]) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();

    for record in records {
        // Records without an id share the `null` key
        let id = record.get("id").cloned().unwrap_or(Value::Null).to_string();
        if !seen.insert(id) {
            duplicates.push(record.clone());
        }
    }

    duplicates
}

fn url_pattern() -> Option<&'static Regex> {
    static URL_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    URL_PATTERN
        .get_or_init(|| {
            Regex::new(concat!(
                r"(?i)^https?://",
                r"(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+[A-Z]{2,6}\.?|",
                r"localhost|",
                r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})",
                r"(?::\d+)?",
                r"(?:/?|[/?]\S+)$",
            ))
            .map_err(|e| tracing::error!("URL pattern failed to compile: {}", e))
            .ok()
        })
        .as_ref()
}

/// Checks that a string looks like an http(s) URL with a real host
///
/// # Examples
///
/// ```
/// use founders_scraper::output::validate_url;
///
/// assert!(validate_url("https://airbnb.com/rooms"));
/// assert!(validate_url("http://localhost:8080"));
/// assert!(!validate_url("airbnb.com"));
/// ```
pub fn validate_url(url: &str) -> bool {
    !url.is_empty() && url_pattern().map_or(false, |re| re.is_match(url))
}

/// Validates every record and computes completeness statistics
pub fn validate_data(records: &[Value]) -> ValidationSummary {
    let mut summary = ValidationSummary {
        total_records: records.len(),
        ..ValidationSummary::default()
    };

    if records.is_empty() {
        return summary;
    }

    let mut scores = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let mut errors = Vec::new();

        if !is_present(record.get("name")) {
            errors.push("Missing name".to_string());
        }

        if !is_present(record.get("website")) {
            errors.push("Missing website".to_string());
        } else if !field_str(record, "website").map_or(false, validate_url) {
            errors.push("Invalid website URL".to_string());
        }

        if !is_present(record.get("source")) {
            errors.push("Missing source".to_string());
        }

        scores.push(completeness_score(record));

        if errors.is_empty() {
            summary.valid_records += 1;
        } else {
            summary.invalid_records += 1;
            summary.validation_errors.push(RecordErrors {
                record_index: index,
                record_id: field_str(record, "id").unwrap_or("unknown").to_string(),
                errors,
            });
        }
    }

    let sum: f64 = scores.iter().sum();
    summary.completeness_stats = Some(CompletenessStats {
        average: sum / scores.len() as f64,
        min: scores.iter().copied().fold(f64::INFINITY, f64::min),
        max: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        records_above_70_percent: scores.iter().filter(|s| **s >= 0.7).count(),
    });

    summary
}

/// Validates the records, finds duplicates and renders a markdown report
///
/// # Returns
///
/// The structured results and the markdown text
pub fn run_qa_pipeline(records: &[Value]) -> (QaResults, String) {
    let now = Utc::now();

    if records.is_empty() {
        tracing::warn!("No records to validate");
        let results = QaResults {
            validation: ValidationSummary::default(),
            duplicates: Vec::new(),
            timestamp: now,
        };
        return (
            results,
            "# QA Report - No Data\n\nNo records provided for validation.".to_string(),
        );
    }

    tracing::info!("Running QA on {} records", records.len());

    let validation = validate_data(records);
    let duplicates = detect_exact_duplicates(records);
    let report = format_report(&validation, &duplicates, now);

    (
        QaResults {
            validation,
            duplicates,
            timestamp: now,
        },
        report,
    )
}

fn format_report(validation: &ValidationSummary, duplicates: &[Value], now: DateTime<Utc>) -> String {
    let mut md = String::new();

    md.push_str("# QA Report\n");
    md.push_str(&format!("**Date**: {}\n", now.format("%Y-%m-%d %H:%M:%S")));
    md.push_str(&format!(
        "**Records analyzed**: {}\n\n",
        validation.total_records
    ));

    md.push_str("## Summary\n");
    md.push_str(&format!(
        "- **Valid records**: {}\n",
        validation.valid_records
    ));
    md.push_str(&format!(
        "- **Invalid records**: {}\n",
        validation.invalid_records
    ));
    md.push_str(&format!(
        "- **Success rate**: {:.1}%\n",
        validation.valid_records as f64 / validation.total_records.max(1) as f64 * 100.0
    ));
    md.push_str(&format!("- **Duplicates**: {}\n\n", duplicates.len()));

    md.push_str("## Completeness\n");
    if let Some(stats) = &validation.completeness_stats {
        md.push_str(&format!("- **Average score**: {:.2}%\n", stats.average * 100.0));
        md.push_str(&format!("- **Minimum score**: {:.2}%\n", stats.min * 100.0));
        md.push_str(&format!("- **Maximum score**: {:.2}%\n", stats.max * 100.0));
        md.push_str(&format!(
            "- **Records >70% complete**: {}\n",
            stats.records_above_70_percent
        ));
    }

    if !validation.validation_errors.is_empty() {
        md.push_str("\n## Validation Errors\n\n");
        for error in validation.validation_errors.iter().take(REPORT_MAX_ERRORS) {
            md.push_str(&format!(
                "- **Record {}** ({}): {}\n",
                error.record_index,
                error.record_id,
                error.errors.join(", ")
            ));
        }

        if validation.validation_errors.len() > REPORT_MAX_ERRORS {
            md.push_str(&format!(
                "- ... and {} more errors\n",
                validation.validation_errors.len() - REPORT_MAX_ERRORS
            ));
        }
    }

    if !duplicates.is_empty() {
        md.push_str(&format!("\n## Duplicates ({})\n\n", duplicates.len()));
        for dup in duplicates.iter().take(REPORT_MAX_DUPLICATES) {
            md.push_str(&format!(
                "- {} ({})\n",
                field_str(dup, "name").unwrap_or("Unknown"),
                field_str(dup, "id").unwrap_or("Unknown")
            ));
        }

        if duplicates.len() > REPORT_MAX_DUPLICATES {
            md.push_str(&format!(
                "- ... and {} more duplicates\n",
                duplicates.len() - REPORT_MAX_DUPLICATES
            ));
        }
    }

    md
}

/// Writes the markdown report and the JSON results side by side
///
/// # Arguments
///
/// * `results` - Structured QA results
/// * `report` - Markdown text
/// * `path` - Markdown file path; defaults to `{logs_dir}/qa_report_<timestamp>.md`
/// * `logs_dir` - Directory used when `path` is `None`
///
/// # Returns
///
/// The markdown and JSON paths
pub fn save_qa_report(
    results: &QaResults,
    report: &str,
    path: Option<&Path>,
    logs_dir: &Path,
) -> Result<(PathBuf, PathBuf)> {
    let md_path = match path {
        Some(path) => path.to_path_buf(),
        None => timestamped_path(logs_dir, "qa_report", "md"),
    };
    let json_path = md_path.with_extension("json");

    std::fs::write(&md_path, report)?;
    write_json(&json_path, results)?;

    tracing::info!("QA report saved: {}", md_path.display());
    tracing::info!("QA results saved: {}", json_path.display());

    Ok((md_path, json_path))
}
