use std::sync::Arc;
use reqwest::Client;
use vn_core::{LanguageModel, Result, Settings};

pub mod dummy;
pub mod gemini;
pub mod groq;

pub use dummy::DummyModel;
pub use gemini::GeminiModel;
pub use groq::GroqModel;

/// The two models the pipeline talks to: a generative model for summaries
/// and cross-article analysis, and a chat model for topics and sentiment.
#[derive(Clone)]
pub struct ModelSet {
    pub generative: Arc<dyn LanguageModel>,
    pub chat: Arc<dyn LanguageModel>,
}

pub fn create_models(settings: &Settings, client: Arc<Client>) -> Result<ModelSet> {
    let generative = GeminiModel::new(
        client.clone(),
        settings.credentials.gemini_api_key.clone(),
        settings.gemini_model.clone(),
        settings.retry,
    )?;
    let chat = GroqModel::new(
        client,
        settings.credentials.groq_api_key.clone(),
        settings.groq_model.clone(),
        settings.retry,
    )?;

    tracing::info!(generative = %settings.gemini_model, chat = %settings.groq_model, "language models configured");

    Ok(ModelSet {
        generative: Arc::new(generative),
        chat: Arc::new(chat),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_models_from_settings() {
        let settings = Settings::from_lookup(|key| match key {
            "NEWS_API_KEY" | "GROQ_API_KEY" | "GENAI_KEY" | "GOOGLE_API_KEY" => Some("k".to_string()),
            _ => None,
        })
        .unwrap();
        let models = create_models(&settings, Arc::new(Client::new())).unwrap();
        assert_eq!(models.generative.name(), "Gemini");
        assert_eq!(models.chat.name(), "Groq");
    }
}
