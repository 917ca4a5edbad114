use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use vn_core::{Error, LanguageModel, Result, RetryPolicy, Stage};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

impl GenerateResponse {
    fn into_text(self, stage: Stage) -> Result<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(Error::invalid_output(stage, format!("prompt was blocked: {}", reason)));
        }

        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .ok_or_else(|| Error::malformed(stage, "generateContent returned no candidates"))?;

        Ok(text)
    }
}

/// Google's generative model, used for summaries and the cross-article
/// analyses.
pub struct GeminiModel {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiModel {
    pub fn new(client: Arc<Client>, api_key: String, model: String, retry: RetryPolicy) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::ConfigurationMissing("GENAI_KEY".to_string()));
        }
        Ok(Self {
            client,
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
            model,
            retry,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn generate_once(&self, stage: Stage, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self.client
            .post(format!("{}/models/{}:generateContent", self.base_url, self.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::from_http(stage, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_status(stage, status, &body));
        }

        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| Error::from_http(stage, e))?
            .into_text(stage)
    }
}

#[async_trait]
impl LanguageModel for GeminiModel {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn complete(&self, stage: Stage, prompt: &str) -> Result<String> {
        tracing::debug!(model = %self.model, %stage, prompt_len = prompt.len(), "sending generateContent");
        self.retry.run(stage, || self.generate_once(stage, prompt)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use vn_core::testing::StubServer;

    fn model(server: &StubServer) -> GeminiModel {
        GeminiModel::new(
            Arc::new(Client::new()),
            "gkey".to_string(),
            "gemini-test".to_string(),
            RetryPolicy::no_retry(Duration::from_secs(5)),
        )
        .unwrap()
        .with_base_url(server.url("/v1beta/"))
    }

    #[tokio::test]
    async fn test_complete_round_trip() {
        let server = StubServer::json(200, r#"{"candidates":[{"content":{"parts":[{"text":"Acme grew."}]}}]}"#)
            .await
            .unwrap();
        let reply = model(&server).complete(Stage::Summarize, "Summarize this").await.unwrap();
        assert_eq!(reply, "Acme grew.");

        let request = &server.requests()[0];
        assert!(request.starts_with("POST /v1beta/models/gemini-test:generateContent?key=gkey "));
        assert!(request.contains(r#"{"contents":[{"parts":[{"text":"Summarize this"}]}]}"#));
    }

    #[tokio::test]
    async fn test_rejected_key_keeps_status() {
        let server = StubServer::json(403, r#"{"error":{"message":"API key not valid"}}"#).await.unwrap();
        let err = model(&server).complete(Stage::Comparative, "x").await.unwrap_err();
        assert!(matches!(err, Error::UpstreamRejected { stage: Stage::Comparative, status: 403, .. }));
    }

    #[test]
    fn test_model_requires_api_key() {
        let result = GeminiModel::new(Arc::new(Client::new()), String::new(), "gemini".to_string(), RetryPolicy::default());
        assert!(matches!(result, Err(Error::ConfigurationMissing(_))));
    }

    #[test]
    fn test_response_joins_parts() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Acme grew. "},{"text":"Profit rose."}],"role":"model"}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.into_text(Stage::Summarize).unwrap(), "Acme grew. Profit rose.");
    }

    #[test]
    fn test_blocked_prompt_is_invalid_output() {
        let raw = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        let err = parsed.into_text(Stage::FinalSummary).unwrap_err();
        assert!(matches!(err, Error::ModelOutputInvalid { stage: Stage::FinalSummary, .. }));
    }

    #[test]
    fn test_missing_candidates_is_malformed() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            parsed.into_text(Stage::Comparative),
            Err(Error::UpstreamMalformedResponse { .. })
        ));
    }
}
