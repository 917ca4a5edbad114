use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use vn_core::{Error, NewsSearch, Result, RetryPolicy, SearchHit, SearchQuery, Stage};

pub const EVENT_REGISTRY_URL: &str = "https://eventregistry.org/api/v1/article/getArticles";

#[derive(Deserialize)]
struct SearchResponse {
    articles: Option<ResultPage>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ResultPage {
    results: Option<Vec<RawHit>>,
}

#[derive(Deserialize)]
struct RawHit {
    title: Option<String>,
    url: Option<String>,
}

impl SearchResponse {
    fn into_hits(self) -> Result<Vec<SearchHit>> {
        if let Some(message) = self.error {
            return Err(Error::malformed(Stage::NewsSearch, format!("service reported an error: {}", message)));
        }

        let results = self
            .articles
            .and_then(|page| page.results)
            .ok_or_else(|| Error::malformed(Stage::NewsSearch, "response has no articles.results field"))?;

        Ok(results
            .into_iter()
            .filter_map(|hit| match (hit.title, hit.url) {
                (Some(title), Some(url)) if !url.trim().is_empty() => Some(SearchHit {
                    title: title.trim().to_string(),
                    url,
                }),
                (title, _) => {
                    tracing::warn!(?title, "skipping search hit without a url");
                    None
                }
            })
            .collect())
    }
}

/// Event Registry article search restricted to English, de-duplicated,
/// title-matching results.
pub struct EventRegistryClient {
    client: Arc<Client>,
    api_key: String,
    endpoint: String,
    retry: RetryPolicy,
}

impl fmt::Debug for EventRegistryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistryClient")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl EventRegistryClient {
    pub fn new(client: Arc<Client>, api_key: String, retry: RetryPolicy) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::ConfigurationMissing("NEWS_API_KEY".to_string()));
        }
        Ok(Self {
            client,
            api_key,
            endpoint: EVENT_REGISTRY_URL.to_string(),
            retry,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn params(&self, query: &SearchQuery) -> Vec<(&'static str, String)> {
        vec![
            ("apiKey", self.api_key.clone()),
            ("keyword", query.keyword.clone()),
            ("keywordLoc", "title".to_string()),
            ("articlesCount", query.count.to_string()),
            ("isDuplicateFilter", "skipDuplicates".to_string()),
            ("lang", "eng".to_string()),
        ]
    }

    async fn search_once(&self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        let response = self.client
            .get(&self.endpoint)
            .query(&self.params(query))
            .send()
            .await
            .map_err(|e| Error::from_http(Stage::NewsSearch, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_status(Stage::NewsSearch, status, &body));
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| Error::from_http(Stage::NewsSearch, e))?
            .into_hits()
    }
}

#[async_trait]
impl NewsSearch for EventRegistryClient {
    fn name(&self) -> &str {
        "Event Registry"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        tracing::info!(keyword = %query.keyword, count = query.count, "searching news");
        self.retry.run(Stage::NewsSearch, || self.search_once(query)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use vn_core::testing::StubServer;

    #[tokio::test]
    async fn test_search_round_trip() {
        let server = StubServer::json(200, r#"{"articles":{"results":[{"title":"Acme soars","url":"https://a.example/1"}]}}"#)
            .await
            .unwrap();
        let client = EventRegistryClient::new(Arc::new(Client::new()), "nkey".to_string(), RetryPolicy::no_retry(Duration::from_secs(5)))
            .unwrap()
            .with_endpoint(server.url("/api/v1/article/getArticles"));

        let hits = client.search(&SearchQuery::for_company("Acme Corp", 10)).await.unwrap();
        assert_eq!(hits, vec![SearchHit { title: "Acme soars".to_string(), url: "https://a.example/1".to_string() }]);

        let request_line = server.requests()[0].lines().next().unwrap_or_default().to_string();
        assert!(request_line.starts_with("GET /api/v1/article/getArticles?"));
        assert!(request_line.contains("apiKey=nkey"));
        assert!(request_line.contains("keyword=acme+corp"));
        assert!(request_line.contains("isDuplicateFilter=skipDuplicates"));
    }

    fn client() -> EventRegistryClient {
        EventRegistryClient::new(Arc::new(Client::new()), "secret".to_string(), RetryPolicy::default()).unwrap()
    }

    #[test]
    fn test_requires_api_key() {
        let result = EventRegistryClient::new(Arc::new(Client::new()), String::new(), RetryPolicy::default());
        assert!(matches!(result, Err(Error::ConfigurationMissing(_))));
    }

    #[test]
    fn test_query_params() {
        let client = client();
        let query = SearchQuery::for_company("Acme", 10);
        let params = client.params(&query);
        assert!(params.contains(&("keyword", "acme".to_string())));
        assert!(params.contains(&("keywordLoc", "title".to_string())));
        assert!(params.contains(&("articlesCount", "10".to_string())));
        assert!(params.contains(&("isDuplicateFilter", "skipDuplicates".to_string())));
        assert!(params.contains(&("lang", "eng".to_string())));
    }

    #[test]
    fn test_parses_results_in_order() {
        let raw = r#"{"articles": {"results": [
            {"title": " First ", "url": "https://a.example/1", "lang": "eng"},
            {"title": "No url"},
            {"title": "Second", "url": "https://a.example/2"}
        ], "totalResults": 3}}"#;
        let hits = serde_json::from_str::<SearchResponse>(raw).unwrap().into_hits().unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "First");
        assert_eq!(hits[1].url, "https://a.example/2");
    }

    #[test]
    fn test_missing_results_is_malformed() {
        let raw = r#"{"articles": {}}"#;
        let err = serde_json::from_str::<SearchResponse>(raw).unwrap().into_hits().unwrap_err();
        assert!(matches!(err, Error::UpstreamMalformedResponse { stage: Stage::NewsSearch, .. }));

        let raw = r#"{"error": "Invalid API key"}"#;
        let err = serde_json::from_str::<SearchResponse>(raw).unwrap().into_hits().unwrap_err();
        assert!(err.to_string().contains("Invalid API key"));
    }
}
