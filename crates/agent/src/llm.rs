use anyhow::Result;
use async_trait::async_trait;

/// A single-shot completion: standing instruction, user-side context turns
/// sent ahead of the prompt, and the prompt itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system_instruction: String,
    pub context: Vec<String>,
    pub prompt: String,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the generated text verbatim.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
