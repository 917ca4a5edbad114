use std::sync::Arc;
use vn_core::{Article, Error, LanguageModel, Result, Stage};
use crate::prompts;

/// Writes the short narrative that closes a news report.
pub struct FinalSummarizer {
    model: Arc<dyn LanguageModel>,
}

impl FinalSummarizer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub async fn summarize(&self, articles: &[Article]) -> Result<String> {
        if articles.is_empty() {
            return Err(Error::InvalidInput("no articles to summarize".to_string()));
        }
        let reply = self.model.complete(Stage::FinalSummary, &prompts::final_summary(articles)).await?;
        Ok(reply.trim().to_string())
    }
}
