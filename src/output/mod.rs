//! Output module for scraped data and reports
//!
//! This module handles:
//! - Exporting records as JSON and CSV
//! - Recording failed URLs
//! - The data-quality (QA) report
//! - Console summaries

mod export;
pub mod qa;
pub mod stats;

pub use export::{
    export_csv, export_json, load_json_records, setup_directories, timestamped_path, write_json,
};
pub use qa::{
    completeness_score, detect_exact_duplicates, run_qa_pipeline, save_qa_report, validate_data,
    validate_url, QaResults, ValidationSummary,
};
pub use stats::{print_batch_summary, print_compliance, print_status};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A URL that could not be scraped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub url: String,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl FailureRecord {
    /// Records a failure now
    pub fn new(url: &str, error: &impl std::fmt::Display) -> Self {
        Self {
            url: url.to_string(),
            error: error.to_string(),
            timestamp: Utc::now(),
        }
    }
}
