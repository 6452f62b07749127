use anyhow::Result;
use async_trait::async_trait;

/// Core trait that all text generation backends must implement
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`, optionally steered by a system instruction
    ///
    /// Transport, auth and HTTP-status failures are errors, never an error string.
    async fn generate(&self, prompt: &str, system_instruction: Option<&str>) -> Result<String>;

    /// Get the name of the model
    fn name(&self) -> &str;

    /// Check if this is a local model (no API calls leave the machine)
    fn is_local(&self) -> bool;
}
