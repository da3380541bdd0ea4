//! URL handling module
//!
//! Parsing of target URLs, origin extraction for robots.txt lookups, and the
//! line-oriented URL list format used by batch runs.

mod domain;
mod list;

use crate::{UrlError, UrlResult};
use url::Url;

pub use domain::{extract_domain, origin_of};
pub use list::{load_url_list, parse_url_list, sample_url_list};

/// Parses an absolute HTTP(S) URL with a host
///
/// # Examples
///
/// ```
/// use founders_scraper::url::parse_target_url;
///
/// assert!(parse_target_url("https://angel.co/company/airbnb").is_ok());
/// assert!(parse_target_url("ftp://angel.co/").is_err());
/// assert!(parse_target_url("/relative/path").is_err());
/// ```
pub fn parse_target_url(raw: &str) -> UrlResult<Url> {
    let url = Url::parse(raw).map_err(|e| UrlError::Parse {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost(raw.to_string()));
    }

    Ok(url)
}
