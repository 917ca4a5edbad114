//! Translation and speech synthesis backed by Google Cloud APIs.

pub mod speech;
pub mod testing;
pub mod translate;

use std::sync::Arc;
use reqwest::Client;
use vn_core::{Result, Settings, SpeechSynthesizer, Translator};

pub use speech::GoogleSpeech;
pub use translate::GoogleTranslator;

/// The voice services a deployment talks to.
#[derive(Clone)]
pub struct VoiceServices {
    pub translator: Arc<dyn Translator>,
    pub speech: Arc<dyn SpeechSynthesizer>,
}

pub fn create_voice_services(settings: &Settings, client: Arc<Client>) -> Result<VoiceServices> {
    let key = settings.credentials.google_api_key.clone();
    Ok(VoiceServices {
        translator: Arc::new(GoogleTranslator::new(client.clone(), key.clone(), settings.retry)?),
        speech: Arc::new(GoogleSpeech::new(client, key, settings.retry)?),
    })
}
