use std::sync::Arc;
use vn_core::{SpeechSynthesizer, Translator};
use vn_scrappers::NewsPipeline;
use vn_voice::VoiceServices;

/// Shared by every request. Holds no per-request data.
pub struct AppState {
    pub pipeline: Arc<NewsPipeline>,
    pub translator: Arc<dyn Translator>,
    pub speech: Arc<dyn SpeechSynthesizer>,
}

impl AppState {
    pub fn new(pipeline: NewsPipeline, voice: VoiceServices) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            translator: voice.translator,
            speech: voice.speech,
        }
    }
}
