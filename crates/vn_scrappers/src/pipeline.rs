use vn_core::{ComparativeReport, Error, NewsReport, Result};
use vn_inference::{ComparativeAnalyzer, FinalSummarizer};
use crate::manager::NewsFetcher;

/// fetch → (comparative ‖ final summary). Every call builds its own report.
pub struct NewsPipeline {
    fetcher: NewsFetcher,
    comparative: ComparativeAnalyzer,
    summarizer: FinalSummarizer,
}

impl NewsPipeline {
    pub fn new(fetcher: NewsFetcher, comparative: ComparativeAnalyzer, summarizer: FinalSummarizer) -> Self {
        Self {
            fetcher,
            comparative,
            summarizer,
        }
    }

    pub async fn run(&self, company: &str) -> Result<NewsReport> {
        let company = company.trim();
        if company.is_empty() {
            return Err(Error::InvalidInput("company must not be empty".to_string()));
        }

        let articles = self.fetcher.fetch(company).await?;

        if articles.is_empty() {
            tracing::warn!(company, "no articles found");
            return Ok(NewsReport {
                company: company.to_string(),
                articles,
                comparative: ComparativeReport::default(),
                final_summary: format!("No recent news articles were found for {}.", company),
            });
        }

        let (comparative, final_summary) = tokio::try_join!(
            self.comparative.compare(&articles),
            self.summarizer.summarize(&articles),
        )?;

        Ok(NewsReport {
            company: company.to_string(),
            articles,
            comparative,
            final_summary,
        })
    }
}
