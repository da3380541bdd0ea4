//! Best-effort terms-of-service link discovery

use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

/// Fragments that usually identify a ToS/legal page
pub const TOS_FRAGMENTS: [&str; 5] = ["/terms", "/legal", "/privacy", "/tos", "/terms-of-service"];

/// Outcome of scanning a page for ToS links
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TosResult {
    pub has_tos_links: bool,
    pub tos_links: Vec<String>,
    pub page_title: Option<String>,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

impl TosResult {
    /// Result for a page that could not be fetched
    pub fn failed(status_code: Option<u16>, error: Option<String>) -> Self {
        Self {
            status_code,
            error,
            ..Self::default()
        }
    }
}

/// Finds ToS links in an HTML document
///
/// For each fragment, the first `<a href>` whose href contains it
/// (case-insensitive) is resolved against `base` and kept. A link matching
/// several fragments is listed once.
///
/// # Returns
///
/// The links in fragment order and the page `<title>`, if any
pub fn find_tos_links(html: &str, base: &Url) -> (Vec<String>, Option<String>) {
    let document = Html::parse_document(html);

    let hrefs: Vec<&str> = match Selector::parse("a[href]") {
        Ok(selector) => document
            .select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .collect(),
        Err(_) => Vec::new(),
    };

    let mut links: Vec<String> = Vec::new();
    for fragment in TOS_FRAGMENTS {
        let found = hrefs
            .iter()
            .find(|href| href.to_lowercase().contains(fragment));

        if let Some(href) = found {
            if let Ok(resolved) = base.join(href) {
                let resolved = resolved.to_string();
                if !links.contains(&resolved) {
                    links.push(resolved);
                }
            }
        }
    }

    let title = Selector::parse("title").ok().and_then(|selector| {
        document
            .select(&selector)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    });

    (links, title)
}
