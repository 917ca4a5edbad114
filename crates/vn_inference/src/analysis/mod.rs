use std::fmt;
use std::sync::Arc;
use vn_core::{Article, LanguageModel, Result, Stage};
use crate::models::ModelSet;
use crate::preprocess::preprocess;
use crate::prompts;

pub mod comparative;
pub mod summary;

pub use comparative::ComparativeAnalyzer;
pub use summary::FinalSummarizer;

/// Derives summary, topics and sentiment for a single article.
pub struct ArticleAnalyzer {
    generative: Arc<dyn LanguageModel>,
    chat: Arc<dyn LanguageModel>,
}

impl fmt::Debug for ArticleAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticleAnalyzer")
            .field("generative", &self.generative.name())
            .field("chat", &self.chat.name())
            .finish()
    }
}

impl ArticleAnalyzer {
    pub fn new(models: &ModelSet) -> Self {
        Self {
            generative: models.generative.clone(),
            chat: models.chat.clone(),
        }
    }

    pub async fn summarize(&self, content: &str) -> Result<String> {
        let reply = self.generative.complete(Stage::Summarize, &prompts::article_summary(content)).await?;
        Ok(reply.trim().to_string())
    }

    /// Stored verbatim: the reply is usually a list-looking string but is not
    /// validated.
    pub async fn extract_topics(&self, summary: &str) -> Result<String> {
        let reply = self.chat.complete(Stage::ExtractTopics, &prompts::topic_keywords(summary)).await?;
        Ok(reply.trim().to_string())
    }

    pub async fn classify_sentiment(&self, summary: &str) -> Result<String> {
        let cleaned = preprocess(summary);
        let reply = self.chat.complete(Stage::ClassifySentiment, &prompts::sentiment(&cleaned)).await?;
        Ok(reply.trim().to_string())
    }

    /// Summarizes `content`, then extracts topics and classifies sentiment
    /// from the summary concurrently. Errors carry `index`.
    pub async fn analyze(&self, index: usize, title: &str, url: &str, content: &str) -> Result<Article> {
        let summary = self.summarize(content).await.map_err(|e| e.with_article(index))?;

        let (topics, sentiment) = tokio::try_join!(
            self.extract_topics(&summary),
            self.classify_sentiment(&summary),
        )
        .map_err(|e| e.with_article(index))?;

        tracing::debug!(index, %sentiment, "article analyzed");

        Ok(Article {
            title: title.to_string(),
            url: url.to_string(),
            summary,
            sentiment,
            topics,
        })
    }
}
