//! Company record extraction
//!
//! Turns a fetched page into a [`CompanyRecord`] using the selector lists of
//! the source the URL belongs to.

mod selectors;

pub use selectors::{extract_with_selectors, SourceSelectors};

use chrono::{SecondsFormat, Utc};
use scraper::Html;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

/// Known startup directories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Crunchbase,
    AngelList,
    ProductHunt,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [Self::Crunchbase, Self::AngelList, Self::ProductHunt];

    /// Name used in record ids and the `source` field
    pub fn name(&self) -> &'static str {
        match self {
            Self::Crunchbase => "crunchbase",
            Self::AngelList => "angellist",
            Self::ProductHunt => "producthunt",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Crunchbase => "https://www.crunchbase.com",
            Self::AngelList => "https://angel.co",
            Self::ProductHunt => "https://www.producthunt.com",
        }
    }

    pub fn selectors(&self) -> &'static SourceSelectors {
        SourceSelectors::for_source(*self)
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered `(host fragment, source)` rules
///
/// The first rule whose fragment occurs in the lowercased host wins.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    rules: Vec<(String, SourceKind)>,
}

impl SourceRegistry {
    /// Registry with no rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends a rule after the existing ones
    pub fn with_rule(mut self, host_fragment: &str, source: SourceKind) -> Self {
        self.rules.push((host_fragment.to_lowercase(), source));
        self
    }

    /// Finds the source for a URL
    ///
    /// # Examples
    ///
    /// ```
    /// use founders_scraper::{SourceKind, SourceRegistry};
    ///
    /// let registry = SourceRegistry::default();
    /// assert_eq!(
    ///     registry.source_for("https://angel.co/company/airbnb"),
    ///     Some(SourceKind::AngelList)
    /// );
    /// assert_eq!(registry.source_for("https://example.com/"), None);
    /// ```
    pub fn source_for(&self, url: &str) -> Option<SourceKind> {
        let url = Url::parse(url).ok()?;
        let host = url.host_str()?.to_lowercase();

        self.rules
            .iter()
            .find(|(fragment, _)| host.contains(fragment.as_str()))
            .map(|(_, source)| *source)
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::empty()
            .with_rule("crunchbase", SourceKind::Crunchbase)
            .with_rule("angel.co", SourceKind::AngelList)
            .with_rule("producthunt", SourceKind::ProductHunt)
    }
}

/// One extracted company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub id: String,
    pub name: String,
    pub website: String,
    pub description: String,
    pub source: String,
    /// RFC 3339 UTC timestamp ending in `Z`
    pub scraped_at: String,
    pub source_url: String,
}

/// Extracts a record from an HTML document
///
/// # Arguments
///
/// * `html` - Page body
/// * `source` - Which selector lists to use
/// * `source_url` - The URL the page was requested from
pub fn extract_record(html: &str, source: SourceKind, source_url: &str) -> CompanyRecord {
    let document = Html::parse_document(html);
    let selectors = source.selectors();

    let name = extract_with_selectors(&document, selectors.name);
    let website = normalize_website(extract_with_selectors(&document, selectors.website));
    let description = extract_with_selectors(&document, selectors.description);

    let now = Utc::now();
    let id = generate_id(source, &name, &website, now.timestamp_millis());

    CompanyRecord {
        id,
        name,
        website,
        description,
        source: source.name().to_string(),
        scraped_at: now.to_rfc3339_opts(SecondsFormat::Micros, true),
        source_url: source_url.to_string(),
    }
}

/// Prefixes `https://` to a non-empty website that does not start with `http`
pub fn normalize_website(website: String) -> String {
    if website.is_empty() || website.starts_with("http") {
        website
    } else {
        format!("https://{}", website)
    }
}

/// Builds a record id
///
/// `{source}_{millis}`, plus `_{hash}` (first 8 hex chars of the SHA-256 of
/// `"{name}_{website}"`) when both name and website are present.
pub fn generate_id(source: SourceKind, name: &str, website: &str, timestamp_millis: i64) -> String {
    let base = format!("{}_{}", source.name(), timestamp_millis);
    if name.is_empty() || website.is_empty() {
        return base;
    }

    let digest = Sha256::digest(format!("{}_{}", name, website).as_bytes());
    let hash = hex::encode(digest);
    format!("{}_{}", base, &hash[..8])
}

/// Checks required fields and the website scheme
///
/// # Returns
///
/// * `Ok(())` - The record is valid
/// * `Err(message)` - `"Missing required fields"` or `"Invalid URL format"`
pub fn validate_record(record: &CompanyRecord) -> Result<(), &'static str> {
    if record.name.is_empty() || record.website.is_empty() {
        return Err("Missing required fields");
    }

    if !(record.website.starts_with("http://") || record.website.starts_with("https://")) {
        return Err("Invalid URL format");
    }

    Ok(())
}
