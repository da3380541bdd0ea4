use std::path::Path;

/// Parses a line-oriented URL list
///
/// One URL per line; surrounding whitespace is trimmed, blank lines and lines
/// starting with `#` are skipped. Order is preserved.
pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Reads and parses a URL list file
pub fn load_url_list(path: &Path) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_url_list(&content))
}

/// Contents of the sample URL file written by the `sample` command
pub fn sample_url_list() -> String {
    [
        "# Example URLs for batch scraping",
        "# Format: one URL per line",
        "# Lines starting with # are comments",
        "",
        "https://www.crunchbase.com/organization/airbnb",
        "https://angel.co/company/airbnb",
        "https://www.producthunt.com/products/airbnb",
        "",
        "# Add more URLs here...",
    ]
    .join("\n")
}
