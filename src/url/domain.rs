use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use founders_scraper::url::extract_domain;
///
/// let url = Url::parse("https://WWW.Crunchbase.com/organization/airbnb").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.crunchbase.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the origin (scheme, host and explicit port) of a URL
///
/// Robots.txt lives at the root of an origin, and compliance results are
/// cached per origin.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use founders_scraper::url::origin_of;
///
/// let url = Url::parse("https://angel.co/company/airbnb?tab=jobs").unwrap();
/// assert_eq!(origin_of(&url), Some("https://angel.co".to_string()));
/// ```
pub fn origin_of(url: &Url) -> Option<String> {
    let host = extract_domain(url)?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}
