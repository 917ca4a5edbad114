use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use vn_core::{Error, LanguageModel, Result, RetryPolicy, Stage};

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-style model served by Groq's OpenAI-compatible API.
pub struct GroqModel {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl fmt::Debug for GroqModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl GroqModel {
    pub fn new(client: Arc<Client>, api_key: String, model: String, retry: RetryPolicy) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::ConfigurationMissing("GROQ_API_KEY".to_string()));
        }
        Ok(Self {
            client,
            api_key,
            base_url: GROQ_BASE_URL.to_string(),
            model,
            retry,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn chat_once(&self, stage: Stage, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self.client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::from_http(stage, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_status(stage, status, &body));
        }

        let response = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| Error::from_http(stage, e))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::malformed(stage, "chat completion had no message content"))
    }
}

#[async_trait]
impl LanguageModel for GroqModel {
    fn name(&self) -> &str {
        "Groq"
    }

    async fn complete(&self, stage: Stage, prompt: &str) -> Result<String> {
        tracing::debug!(model = %self.model, %stage, prompt_len = prompt.len(), "sending chat completion");
        self.retry.run(stage, || self.chat_once(stage, prompt)).await
    }
}
