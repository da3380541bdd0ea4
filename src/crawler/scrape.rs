use crate::config::Config;
use crate::crawler::pipeline::FetchPipeline;
use crate::extract::{extract_record, validate_record, CompanyRecord, SourceRegistry};
use crate::output::FailureRecord;
use crate::{Result, ScraperError};

/// Records and failures of a batch scrape, in input order
#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    pub records: Vec<CompanyRecord>,
    pub failures: Vec<FailureRecord>,
}

impl ScrapeOutcome {
    /// Percentage of URLs that produced a record
    pub fn success_rate(&self) -> f64 {
        let total = self.records.len() + self.failures.len();
        if total == 0 {
            0.0
        } else {
            self.records.len() as f64 / total as f64 * 100.0
        }
    }
}

/// Fetch pipeline plus source-specific extraction
#[derive(Debug, Clone)]
pub struct Scraper {
    pipeline: FetchPipeline,
    registry: SourceRegistry,
}

impl Scraper {
    pub fn new(pipeline: FetchPipeline, registry: SourceRegistry) -> Self {
        Self { pipeline, registry }
    }

    /// Builds a scraper with the default source registry
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            FetchPipeline::from_config(config)?,
            SourceRegistry::default(),
        ))
    }

    pub fn pipeline(&self) -> &FetchPipeline {
        &self.pipeline
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Fetches a URL and extracts a company record from it
    ///
    /// URLs outside the registry are rejected before any request is sent.
    /// A record that fails validation is still returned; the failure is
    /// logged.
    ///
    /// # Errors
    ///
    /// * `NoExtractor` - No registry rule matches the URL's host
    /// * Any error from [`FetchPipeline::fetch`]
    pub async fn scrape_url(&self, url: &str) -> Result<CompanyRecord> {
        tracing::info!("Starting scrape: {}", url);

        let source = self
            .registry
            .source_for(url)
            .ok_or_else(|| ScraperError::NoExtractor {
                url: url.to_string(),
            })?;

        let page = self.pipeline.fetch(url).await?;
        let record = extract_record(&page.text(), source, url);

        if let Err(message) = validate_record(&record) {
            tracing::warn!("Data validation failed: {}", message);
        }

        self.pipeline.metrics().record_extraction();
        tracing::info!(
            "Extracted data: {} from {}",
            if record.name.is_empty() { "Unknown" } else { &record.name },
            record.source
        );

        Ok(record)
    }

    /// Scrapes every URL in order; one failure never stops the batch
    pub async fn scrape_batch(&self, urls: &[String]) -> ScrapeOutcome {
        tracing::info!("Starting batch scrape of {} URLs", urls.len());
        let mut outcome = ScrapeOutcome::default();

        for (index, url) in urls.iter().enumerate() {
            tracing::info!("Processing {}/{}: {}", index + 1, urls.len(), url);

            match self.scrape_url(url).await {
                Ok(record) => outcome.records.push(record),
                Err(e) => {
                    tracing::error!("Failed to scrape {}: {}", url, e);
                    outcome.failures.push(FailureRecord::new(url, &e));
                }
            }
        }

        tracing::info!(
            "Batch complete: {} successful, {} errors",
            outcome.records.len(),
            outcome.failures.len()
        );
        outcome
    }
}
