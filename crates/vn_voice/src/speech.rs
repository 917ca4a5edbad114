use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use vn_core::{AudioArtifact, AudioEncoding, Error, Result, RetryPolicy, SpeechSynthesizer, Stage, VoiceConfig, VoiceGender};

pub const SYNTHESIZE_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

#[derive(Serialize)]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    #[serde(rename = "audioConfig")]
    audio_config: AudioConfig,
}

#[derive(Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct VoiceSelection<'a> {
    #[serde(rename = "languageCode")]
    language_code: &'a str,
    #[serde(rename = "ssmlGender")]
    ssml_gender: VoiceGender,
}

#[derive(Serialize)]
struct AudioConfig {
    #[serde(rename = "audioEncoding")]
    audio_encoding: AudioEncoding,
}

impl<'a> SynthesizeRequest<'a> {
    fn new(text: &'a str, voice: &'a VoiceConfig) -> Self {
        Self {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: &voice.language_code,
                ssml_gender: voice.gender,
            },
            audio_config: AudioConfig {
                audio_encoding: voice.encoding,
            },
        }
    }
}

#[derive(Deserialize)]
struct SynthesizeResponse {
    #[serde(rename = "audioContent")]
    audio_content: Option<String>,
}

impl SynthesizeResponse {
    fn into_bytes(self) -> Result<Vec<u8>> {
        let encoded = self
            .audio_content
            .ok_or_else(|| Error::malformed(Stage::Speech, "response has no audioContent"))?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::malformed(Stage::Speech, format!("audioContent is not valid base64: {}", e)))
    }
}

/// Google Cloud Text-to-Speech (v1, API key auth).
pub struct GoogleSpeech {
    client: Arc<Client>,
    api_key: String,
    endpoint: String,
    retry: RetryPolicy,
}

impl fmt::Debug for GoogleSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleSpeech")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl GoogleSpeech {
    pub fn new(client: Arc<Client>, api_key: String, retry: RetryPolicy) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::ConfigurationMissing("GOOGLE_API_KEY".to_string()));
        }
        Ok(Self {
            client,
            api_key,
            endpoint: SYNTHESIZE_URL.to_string(),
            retry,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn synthesize_once(&self, text: &str, voice: &VoiceConfig) -> Result<Vec<u8>> {
        let response = self.client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&SynthesizeRequest::new(text, voice))
            .send()
            .await
            .map_err(|e| Error::from_http(Stage::Speech, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_status(Stage::Speech, status, &body));
        }

        response
            .json::<SynthesizeResponse>()
            .await
            .map_err(|e| Error::from_http(Stage::Speech, e))?
            .into_bytes()
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleSpeech {
    fn name(&self) -> &str {
        "Google Text-to-Speech"
    }

    async fn synthesize(&self, text: &str, voice: &VoiceConfig) -> Result<AudioArtifact> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("text to synthesize must not be empty".to_string()));
        }
        if voice.language_code.trim().is_empty() {
            return Err(Error::InvalidInput("lang must not be empty".to_string()));
        }

        tracing::debug!(lang = %voice.language_code, chars = text.chars().count(), "synthesizing speech");
        let bytes = self.retry.run(Stage::Speech, || self.synthesize_once(text, voice)).await?;
        if bytes.is_empty() {
            return Err(Error::malformed(Stage::Speech, "audioContent is empty"));
        }

        tracing::info!(lang = %voice.language_code, bytes = bytes.len(), "🔊 speech ready");
        Ok(AudioArtifact {
            bytes,
            encoding: voice.encoding,
            language_code: voice.language_code.clone(),
        })
    }
}
