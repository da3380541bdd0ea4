//! Per-source CSS selector lists
//!
//! Each field has an ordered list of selectors; the first element with
//! non-empty text wins.

use crate::extract::SourceKind;
use scraper::{Html, Selector};

/// Ordered selector lists for one source
#[derive(Debug, Clone, Copy)]
pub struct SourceSelectors {
    pub name: &'static [&'static str],
    pub website: &'static [&'static str],
    /// Long description, or the tagline for sources without one
    pub description: &'static [&'static str],
}

const CRUNCHBASE: SourceSelectors = SourceSelectors {
    name: &[
        r#"h1[class*="profile"]"#,
        ".profile-header h1",
        "h1.company-name",
    ],
    website: &[
        r#"a[href*="website"]"#,
        r#"[data-test="company-website"]"#,
        ".company-link a",
    ],
    description: &[".description", ".about-company", ".company-summary"],
};

const ANGELLIST: SourceSelectors = SourceSelectors {
    name: &[".startup-name", r#"h1[class*="name"]"#, ".profile-title"],
    website: &[".company-url", r#"a[href^="http"]"#, ".website-link"],
    description: &[".tagline", ".company-tagline", ".profile-tagline"],
};

const PRODUCTHUNT: SourceSelectors = SourceSelectors {
    name: &[r#"h1[class*="name"]"#, ".product-title", ".item-title"],
    website: &[".website-link", r#"a[href^="http"]"#, ".product-link"],
    description: &[".tagline", ".product-tagline", ".summary"],
};

impl SourceSelectors {
    pub fn for_source(source: SourceKind) -> &'static SourceSelectors {
        match source {
            SourceKind::Crunchbase => &CRUNCHBASE,
            SourceKind::AngelList => &ANGELLIST,
            SourceKind::ProductHunt => &PRODUCTHUNT,
        }
    }
}

/// Returns the text of the first matching element with non-empty text
///
/// Text nodes are trimmed and concatenated. Selectors that fail to parse are
/// skipped.
///
/// # Returns
///
/// The text, or an empty string when nothing matched
pub fn extract_with_selectors(document: &Html, selectors: &[&str]) -> String {
    for raw in selectors {
        let selector = match Selector::parse(raw) {
            Ok(selector) => selector,
            Err(e) => {
                tracing::debug!("Selector failed: {} - {:?}", raw, e);
                continue;
            }
        };

        let found = document
            .select(&selector)
            .map(|element| element.text().map(str::trim).collect::<String>())
            .find(|text| !text.is_empty());

        if let Some(text) = found {
            return text;
        }
    }

    String::new()
}
