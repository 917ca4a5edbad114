use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use reqwest::{header, Client};
use scraper::Html;
use vn_core::{Error, PageContent, PageScraper, Result, RetryPolicy, Stage};
use crate::scrapers::utils;

/// Block-level containers whose text makes up an article's working text.
const CONTENT_SELECTOR: &str = "div";

/// Fetches article pages over HTTP and keeps the text of their containers.
pub struct HttpPageScraper {
    client: Arc<Client>,
    user_agent: String,
    retry: RetryPolicy,
}

impl fmt::Debug for HttpPageScraper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpPageScraper")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Concatenates the text of every content container in `html`.
pub fn extract_article_text(html: &str) -> String {
    let document = Html::parse_document(html);
    utils::extract_texts(&document, CONTENT_SELECTOR)
        .map(|texts| texts.join(" "))
        .unwrap_or_default()
}

impl HttpPageScraper {
    pub fn new(client: Arc<Client>, user_agent: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
            retry,
        }
    }

    /// Transport failures are errors (and retried); any HTTP status is a
    /// successful fetch for the caller to judge.
    async fn fetch_html(&self, url: &str) -> Result<(reqwest::StatusCode, String)> {
        let response = self.client
            .get(url)
            .header(header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| Error::from_http(Stage::PageFetch, e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Ok((status, String::new()));
        }

        let html = response.text().await.map_err(|e| Error::from_http(Stage::PageFetch, e))?;
        Ok((status, html))
    }
}

#[async_trait]
impl PageScraper for HttpPageScraper {
    async fn scrape_page(&self, url: &str) -> PageContent {
        if let Err(e) = utils::parse_url(url) {
            return PageContent::Unavailable {
                status: None,
                reason: e.to_string(),
            };
        }

        match self.retry.run(Stage::PageFetch, || self.fetch_html(url)).await {
            Ok((status, html)) if status == reqwest::StatusCode::OK => PageContent::Text(extract_article_text(&html)),
            Ok((status, _)) => PageContent::Unavailable {
                status: Some(status.as_u16()),
                reason: format!("HTTP {}", status),
            },
            Err(e) => PageContent::Unavailable {
                status: None,
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use vn_core::testing::StubServer;

    fn scraper() -> HttpPageScraper {
        HttpPageScraper::new(Arc::new(Client::new()), "VaaniNewsTest/1.0", RetryPolicy::no_retry(Duration::from_secs(5)))
    }

    #[tokio::test]
    async fn test_ok_page_yields_div_text() {
        let server = StubServer::start(200, "text/html", "<html><body><div>a</div><div>b</div><p>c</p></body></html>")
            .await
            .unwrap();
        let content = scraper().scrape_page(&server.url("/story")).await;
        assert_eq!(content, PageContent::Text("a b".to_string()));

        let request = server.requests()[0].to_lowercase();
        assert!(request.starts_with("get /story "));
        assert!(request.contains("user-agent: vaaninewstest/1.0"));
    }

    #[tokio::test]
    async fn test_non_ok_status_is_unavailable() {
        let server = StubServer::start(403, "text/html", "<div>Forbidden</div>").await.unwrap();
        let content = scraper().scrape_page(&server.url("/paywalled")).await;
        assert!(matches!(content, PageContent::Unavailable { status: Some(403), .. }));
    }

    #[test]
    fn test_extract_article_text_joins_divs() {
        let html = r#"
            <html><head><title>ignored</title><script>var x = 1;</script></head>
            <body>
                <nav>Menu</nav>
                <div>Acme reported strong results.</div>
                <p>Loose paragraph</p>
                <div>Shares rose 5%.</div>
            </body></html>
        "#;
        assert_eq!(extract_article_text(html), "Acme reported strong results. Shares rose 5%.");
    }

    #[test]
    fn test_extract_article_text_without_containers() {
        assert_eq!(extract_article_text("<p>No containers here</p>"), "");
        assert_eq!(extract_article_text(""), "");
    }

    #[tokio::test]
    async fn test_invalid_url_is_unavailable_not_error() {
        let scraper = HttpPageScraper::new(
            Arc::new(Client::new()),
            vn_core::config::DEFAULT_USER_AGENT,
            RetryPolicy::no_retry(Duration::from_secs(1)),
        );
        let content = scraper.scrape_page("not a url").await;
        assert!(matches!(content, PageContent::Unavailable { status: None, .. }));
        assert_eq!(content.into_text(), "");
    }
}
