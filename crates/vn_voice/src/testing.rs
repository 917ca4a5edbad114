//! In-process stand-ins for the Google services.

use async_trait::async_trait;
use vn_core::{AudioArtifact, Error, Result, SpeechSynthesizer, Translator, VoiceConfig};

/// Prefixes the text with the target language: `[hi] Hello`.
#[derive(Debug, Default, Clone)]
pub struct EchoTranslator;

#[async_trait]
impl Translator for EchoTranslator {
    fn name(&self) -> &str {
        "echo"
    }

    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("text to translate must not be empty".to_string()));
        }
        Ok(format!("[{}] {}", target_language, text))
    }
}

/// Returns the UTF-8 bytes of the text as "audio".
#[derive(Debug, Default, Clone)]
pub struct EchoSpeech;

#[async_trait]
impl SpeechSynthesizer for EchoSpeech {
    fn name(&self) -> &str {
        "echo"
    }

    async fn synthesize(&self, text: &str, voice: &VoiceConfig) -> Result<AudioArtifact> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("text to synthesize must not be empty".to_string()));
        }
        Ok(AudioArtifact {
            bytes: text.as_bytes().to_vec(),
            encoding: voice.encoding,
            language_code: voice.language_code.clone(),
        })
    }
}
