use async_trait::async_trait;
use crate::error::Stage;
use crate::Result;

/// A text-in, text-out model. Both the generative summary service and the
/// chat-style model sit behind this trait.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn name(&self) -> &str;

    /// Sends one prompt and returns the model's reply as plain text. `stage`
    /// tags errors and log lines with the pipeline step being served.
    async fn complete(&self, stage: Stage, prompt: &str) -> Result<String>;
}
