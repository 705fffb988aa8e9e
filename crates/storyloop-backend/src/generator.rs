use async_trait::async_trait;
use storyloop_prompt::Draft;
use tracing::debug;

use crate::{BackendError, CompletionRequest, GenerationOptions, TextBackend};

/// The story-drafting capability.
///
/// Polymorphic over implementation so the refinement loop can run against a
/// deterministic double instead of a live service.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce a draft for the given prompt and round.
    async fn generate(&self, prompt: &str, round_index: usize) -> Result<Draft, BackendError>;
}

/// Live generator backed by a [`TextBackend`].
pub struct StoryGenerator<'a> {
    backend: &'a dyn TextBackend,
    options: GenerationOptions,
}

impl<'a> StoryGenerator<'a> {
    pub fn new(backend: &'a dyn TextBackend, options: GenerationOptions) -> Self {
        Self { backend, options }
    }
}

#[async_trait]
impl Generator for StoryGenerator<'_> {
    async fn generate(&self, prompt: &str, round_index: usize) -> Result<Draft, BackendError> {
        debug!(
            backend = self.backend.name(),
            round = round_index,
            prompt_len = prompt.len(),
            "Generating draft"
        );

        let request = CompletionRequest::new(
            prompt,
            self.options.temperature,
            self.options.max_tokens,
        );
        let text = self.backend.complete(&request).await?;

        if text.trim().is_empty() {
            return Err(BackendError::Empty);
        }
        Ok(Draft::new(text, round_index))
    }
}
