//! In-memory stand-ins for the news search and page services, for tests and
//! local wiring of the pipeline.

use std::collections::HashMap;
use async_trait::async_trait;
use vn_core::{NewsSearch, PageContent, PageScraper, Result, SearchHit, SearchQuery};

/// Returns the same hits for every query.
#[derive(Debug, Clone, Default)]
pub struct StaticSearch {
    hits: Vec<SearchHit>,
}

impl StaticSearch {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self { hits }
    }
}

#[async_trait]
impl NewsSearch for StaticSearch {
    fn name(&self) -> &str {
        "static"
    }

    async fn search(&self, _query: &SearchQuery) -> Result<Vec<SearchHit>> {
        Ok(self.hits.clone())
    }
}

/// Serves pages from a map; unknown URLs answer 404.
#[derive(Debug, Clone, Default)]
pub struct StaticPages {
    pages: HashMap<String, String>,
}

impl StaticPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, text: impl Into<String>) -> Self {
        self.pages.insert(url.into(), text.into());
        self
    }
}

#[async_trait]
impl PageScraper for StaticPages {
    async fn scrape_page(&self, url: &str) -> PageContent {
        match self.pages.get(url) {
            Some(text) => PageContent::Text(text.clone()),
            None => PageContent::Unavailable {
                status: Some(404),
                reason: "HTTP 404 Not Found".to_string(),
            },
        }
    }
}
