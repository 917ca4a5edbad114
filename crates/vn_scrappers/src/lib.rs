use std::sync::Arc;
use reqwest::Client;
use vn_core::{Result, Settings};
use vn_inference::{ArticleAnalyzer, ComparativeAnalyzer, FinalSummarizer, ModelSet};

pub mod logging;
pub mod manager;
pub mod pipeline;
pub mod scrapers;
pub mod search;
pub mod testing;

pub use manager::NewsFetcher;
pub use pipeline::NewsPipeline;
pub use scrapers::HttpPageScraper;
pub use search::EventRegistryClient;

/// Wires the production search client, page scraper and models into a
/// pipeline configured from `settings`.
pub fn build_pipeline(settings: &Settings, client: Arc<Client>, models: &ModelSet) -> Result<NewsPipeline> {
    let search = EventRegistryClient::new(client.clone(), settings.credentials.news_api_key.clone(), settings.retry)?;
    let scraper = HttpPageScraper::new(client, settings.user_agent.clone(), settings.retry);

    let fetcher = NewsFetcher::new(Arc::new(search), Arc::new(scraper), Arc::new(ArticleAnalyzer::new(models)))
        .with_max_articles(settings.max_articles)
        .with_concurrency(settings.max_concurrency);

    Ok(NewsPipeline::new(
        fetcher,
        ComparativeAnalyzer::new(models.generative.clone()),
        FinalSummarizer::new(models.generative.clone()),
    ))
}

pub mod prelude {
    pub use super::manager::NewsFetcher;
    pub use super::pipeline::NewsPipeline;
    pub use vn_core::{Article, Error, NewsReport, Result};
}
