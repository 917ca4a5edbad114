pub mod page;

pub use page::HttpPageScraper;

/// Common utilities for scrapers
pub(crate) mod utils {
    use scraper::{Html, Selector};
    use url::Url;
    use vn_core::{Error, Result};

    pub fn parse_url(url: &str) -> Result<Url> {
        let parsed = Url::parse(url).map_err(|e| Error::InvalidInput(format!("Failed to parse URL {}: {}", url, e)))?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            other => Err(Error::InvalidInput(format!("Unsupported URL scheme: {}", other))),
        }
    }

    /// Text of every element matching `selector`, whitespace collapsed.
    pub fn extract_texts(document: &Html, selector: &str) -> Result<Vec<String>> {
        let selector = Selector::parse(selector)
            .map_err(|e| Error::InvalidInput(format!("Invalid selector: {}", e)))?;

        Ok(document
            .select(&selector)
            .map(|el| el.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|text| !text.is_empty())
            .collect())
    }
}
