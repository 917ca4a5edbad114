use async_trait::async_trait;
use crate::types::{AudioArtifact, SearchHit, SearchQuery, VoiceConfig};
use crate::Result;

#[async_trait]
pub trait NewsSearch: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the hits for `query` in the order the service ranked them.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>>;
}

/// Outcome of fetching one article page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageContent {
    /// Visible text extracted from the page.
    Text(String),
    /// The page could not be retrieved; the status is kept for logging.
    Unavailable { status: Option<u16>, reason: String },
}

impl PageContent {
    /// Working text for the analyzer. Unavailable pages contribute nothing.
    pub fn into_text(self) -> String {
        match self {
            PageContent::Text(text) => text,
            PageContent::Unavailable { .. } => String::new(),
        }
    }
}

#[async_trait]
pub trait PageScraper: Send + Sync {
    /// Fetches `url` and extracts its text. Retrieval failures are reported
    /// as [`PageContent::Unavailable`] rather than as errors.
    async fn scrape_page(&self, url: &str) -> PageContent;
}

#[async_trait]
pub trait Translator: Send + Sync {
    fn name(&self) -> &str;

    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn name(&self) -> &str;

    async fn synthesize(&self, text: &str, voice: &VoiceConfig) -> Result<AudioArtifact>;
}
