use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use futures::future::try_join_all;
use tokio::sync::Semaphore;
use vn_core::config::DEFAULT_MAX_ARTICLES;
use vn_core::{Article, ArticleSet, Error, NewsSearch, PageContent, PageScraper, Result, SearchHit, SearchQuery, Stage};
use vn_inference::ArticleAnalyzer;
use crate::logging::Logger;

/// Turns a company name into an analysed article set: search, scrape each
/// hit, then summarize/tag it. Article tasks run concurrently up to the
/// semaphore's limit and come back in search order.
pub struct NewsFetcher {
    search: Arc<dyn NewsSearch>,
    scraper: Arc<dyn PageScraper>,
    analyzer: Arc<ArticleAnalyzer>,
    semaphore: Arc<Semaphore>,
    max_articles: usize,
}

impl fmt::Debug for NewsFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsFetcher")
            .field("search", &self.search.name())
            .field("max_articles", &self.max_articles)
            .field("available_permits", &self.semaphore.available_permits())
            .finish()
    }
}

impl NewsFetcher {
    pub fn new(search: Arc<dyn NewsSearch>, scraper: Arc<dyn PageScraper>, analyzer: Arc<ArticleAnalyzer>) -> Self {
        Self {
            search,
            scraper,
            analyzer,
            semaphore: Arc::new(Semaphore::new(4)),
            max_articles: DEFAULT_MAX_ARTICLES,
        }
    }

    pub fn with_max_articles(mut self, max_articles: usize) -> Self {
        self.max_articles = max_articles;
        self
    }

    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.semaphore = Arc::new(Semaphore::new(limit.max(1)));
        self
    }

    /// Search hits with duplicate URLs removed, cut to the configured count.
    async fn search_hits(&self, company: &str) -> Result<Vec<SearchHit>> {
        let query = SearchQuery::for_company(company, self.max_articles);
        let hits = self.search.search(&query).await?;
        let returned = hits.len();

        let mut seen = HashSet::new();
        let hits: Vec<SearchHit> = hits
            .into_iter()
            .filter(|hit| seen.insert(hit.url.clone()))
            .take(self.max_articles)
            .collect();

        if hits.len() < returned {
            tracing::debug!(returned, kept = hits.len(), "trimmed search hits");
        }
        Ok(hits)
    }

    async fn process_hit(&self, logger: Logger, index: usize, hit: SearchHit) -> Result<Article> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| Error::unavailable(Stage::PageFetch, format!("worker pool closed: {}", e)).with_article(index))?;

        logger.info(&format!("📰 Fetching {}", hit.url));
        let content = match self.scraper.scrape_page(&hit.url).await {
            PageContent::Unavailable { status, reason } => {
                logger.warn(&format!("⚠️ Failed to retrieve content (status {:?}): {}", status, reason));
                String::new()
            }
            text => text.into_text(),
        };

        logger.debug(&format!("🤖 Analyzing {} characters", content.len()));
        let article = self.analyzer.analyze(index, &hit.title, &hit.url, &content).await?;
        logger.info(&format!("✨ {} [{}]", article.title, article.sentiment));
        Ok(article)
    }

    pub async fn fetch(&self, company: &str) -> Result<ArticleSet> {
        let started = Instant::now();
        let hits = self.search_hits(company).await?;
        tracing::info!(company, hits = hits.len(), "🦗 search complete");

        let base = Logger::new().with_prefix(format!("[{}]", company));
        let tasks = hits
            .into_iter()
            .enumerate()
            .map(|(index, hit)| self.process_hit(base.clone().with_prefix(format!("#{}", index)), index, hit));

        let articles = try_join_all(tasks).await?;
        tracing::info!(
            company,
            articles = articles.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "✅ articles analyzed"
        );
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use async_trait::async_trait;
    use vn_inference::models::{DummyModel, ModelSet};

    struct StubSearch {
        hits: Vec<SearchHit>,
        queries: Mutex<Vec<SearchQuery>>,
    }

    impl StubSearch {
        fn with_hits(n: usize) -> Self {
            Self {
                hits: (0..n)
                    .map(|i| SearchHit {
                        title: format!("Acme story {}", i),
                        url: format!("https://news.example/{}", i),
                    })
                    .collect(),
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl NewsSearch for StubSearch {
        fn name(&self) -> &str {
            "stub"
        }

        async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
            self.queries.lock().unwrap().push(query.clone());
            Ok(self.hits.clone())
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl NewsSearch for FailingSearch {
        fn name(&self) -> &str {
            "failing"
        }

        async fn search(&self, _query: &SearchQuery) -> Result<Vec<SearchHit>> {
            Err(Error::malformed(Stage::NewsSearch, "response has no articles.results field"))
        }
    }

    /// Serves every page except those whose URL ends in one of `broken`.
    struct StubScraper {
        broken: Vec<&'static str>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl StubScraper {
        fn new(broken: Vec<&'static str>) -> Self {
            Self {
                broken,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PageScraper for StubScraper {
        async fn scrape_page(&self, url: &str) -> PageContent {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.broken.iter().any(|b| url.ends_with(b)) {
                PageContent::Unavailable {
                    status: Some(403),
                    reason: "HTTP 403 Forbidden".to_string(),
                }
            } else {
                PageContent::Text(format!("Full text of {}", url))
            }
        }
    }

    fn analyzer(generative: DummyModel) -> Arc<ArticleAnalyzer> {
        let chat = DummyModel::new()
            .reply_when("###SUMMARY", "['Acme']")
            .reply_when("###CLEANED SUMMARY", "Neutral");
        Arc::new(ArticleAnalyzer::new(&ModelSet {
            generative: Arc::new(generative),
            chat: Arc::new(chat),
        }))
    }

    #[tokio::test]
    async fn test_fetch_caps_article_count() {
        let search = Arc::new(StubSearch::with_hits(25));
        let fetcher = NewsFetcher::new(search.clone(), Arc::new(StubScraper::new(vec![])), analyzer(DummyModel::new()));

        let articles = fetcher.fetch("Acme").await.unwrap();
        assert_eq!(articles.len(), 10);
        assert_eq!(articles[0].title, "Acme story 0");
        assert_eq!(articles[9].title, "Acme story 9");

        let queries = search.queries.lock().unwrap();
        assert_eq!(queries[0].keyword, "acme");
        assert_eq!(queries[0].count, 10);
    }

    #[tokio::test]
    async fn test_fetch_respects_configured_count_and_dedupes() {
        let mut stub = StubSearch::with_hits(4);
        stub.hits.insert(1, stub.hits[0].clone());
        let fetcher = NewsFetcher::new(Arc::new(stub), Arc::new(StubScraper::new(vec![])), analyzer(DummyModel::new()))
            .with_max_articles(3);

        let articles = fetcher.fetch("Acme").await.unwrap();
        let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Acme story 0", "Acme story 1", "Acme story 2"]);
    }

    #[tokio::test]
    async fn test_unavailable_page_degrades_to_empty_text() {
        let generative = Arc::new(DummyModel::new());
        let fetcher = NewsFetcher::new(
            Arc::new(StubSearch::with_hits(2)),
            Arc::new(StubScraper::new(vec!["/1"])),
            Arc::new(ArticleAnalyzer::new(&ModelSet {
                generative: generative.clone(),
                chat: Arc::new(DummyModel::new()),
            })),
        );

        let articles = fetcher.fetch("Acme").await.unwrap();
        assert_eq!(articles.len(), 2);

        let summary_prompts: Vec<String> = generative
            .prompts()
            .into_iter()
            .filter(|(stage, _)| *stage == Stage::Summarize)
            .map(|(_, prompt)| prompt)
            .collect();
        assert_eq!(summary_prompts.len(), 2);
        assert!(summary_prompts.iter().any(|p| p.contains("Full text of https://news.example/0")));
        assert!(!summary_prompts.iter().any(|p| p.contains("news.example/1")));
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let scraper = Arc::new(StubScraper::new(vec![]));
        let fetcher = NewsFetcher::new(Arc::new(StubSearch::with_hits(8)), scraper.clone(), analyzer(DummyModel::new()))
            .with_concurrency(2);

        fetcher.fetch("Acme").await.unwrap();
        assert!(scraper.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_search_failure_is_fatal() {
        let fetcher = NewsFetcher::new(Arc::new(FailingSearch), Arc::new(StubScraper::new(vec![])), analyzer(DummyModel::new()));
        let err = fetcher.fetch("Acme").await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::NewsSearch));
    }

    #[tokio::test]
    async fn test_analysis_failure_names_the_article() {
        let generative = DummyModel::new().fail_when("news.example/2");
        let fetcher = NewsFetcher::new(Arc::new(StubSearch::with_hits(4)), Arc::new(StubScraper::new(vec![])), analyzer(generative));

        let err = fetcher.fetch("Acme").await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Summarize));
        assert_eq!(err.article(), Some(2));
    }
}
