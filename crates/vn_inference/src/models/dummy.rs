use std::fmt;
use std::sync::Mutex;
use vn_core::{Error, LanguageModel, Result, Stage};

/// Deterministic model for tests and local wiring. Replies are picked by the
/// first rule whose needle occurs in the prompt; without a match the first
/// 20 words of the prompt are echoed back.
#[derive(Default)]
pub struct DummyModel {
    rules: Vec<(String, Reply)>,
    prompts: Mutex<Vec<(Stage, String)>>,
}

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail,
}

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").field("rules", &self.rules.len()).finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_when(mut self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Reply::Text(reply.into())));
        self
    }

    /// Makes prompts containing `needle` fail as an unavailable upstream.
    pub fn fail_when(mut self, needle: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Reply::Fail));
        self
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<(Stage, String)> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl LanguageModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn complete(&self, stage: Stage, prompt: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push((stage, prompt.to_string()));
        }

        match self.rules.iter().find(|(needle, _)| prompt.contains(needle.as_str())) {
            Some((_, Reply::Text(text))) => Ok(text.clone()),
            Some((needle, Reply::Fail)) => Err(Error::unavailable(stage, format!("scripted failure for {:?}", needle))),
            None => Ok(prompt.split_whitespace().take(20).collect::<Vec<_>>().join(" ")),
        }
    }
}
