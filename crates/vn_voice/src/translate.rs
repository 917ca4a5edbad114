use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use vn_core::{Error, Result, RetryPolicy, Stage, Translator};

pub const TRANSLATE_URL: &str = "https://translation.googleapis.com/language/translate/v2";

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    data: Option<TranslationList>,
}

#[derive(Deserialize)]
struct TranslationList {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
struct Translation {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

impl TranslateResponse {
    fn into_text(self) -> Result<String> {
        self.data
            .and_then(|d| d.translations.into_iter().next())
            .and_then(|t| t.translated_text)
            .ok_or_else(|| Error::malformed(Stage::Translation, "response has no data.translations[0].translatedText"))
    }
}

/// Google Cloud Translation (v2, API key auth).
pub struct GoogleTranslator {
    client: Arc<Client>,
    api_key: String,
    endpoint: String,
    retry: RetryPolicy,
}

impl fmt::Debug for GoogleTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleTranslator")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl GoogleTranslator {
    pub fn new(client: Arc<Client>, api_key: String, retry: RetryPolicy) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::ConfigurationMissing("GOOGLE_API_KEY".to_string()));
        }
        Ok(Self {
            client,
            api_key,
            endpoint: TRANSLATE_URL.to_string(),
            retry,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn translate_once(&self, text: &str, target: &str) -> Result<String> {
        let request = TranslateRequest {
            q: text,
            target,
            format: "text",
        };

        let response = self.client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::from_http(Stage::Translation, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_status(Stage::Translation, status, &body));
        }

        response
            .json::<TranslateResponse>()
            .await
            .map_err(|e| Error::from_http(Stage::Translation, e))?
            .into_text()
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn name(&self) -> &str {
        "Google Translate"
    }

    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("text to translate must not be empty".to_string()));
        }
        let target = target_language.trim();
        if target.is_empty() {
            return Err(Error::InvalidInput("target_language must not be empty".to_string()));
        }

        tracing::debug!(target, chars = text.chars().count(), "translating");
        self.retry.run(Stage::Translation, || self.translate_once(text, target)).await
    }
}
