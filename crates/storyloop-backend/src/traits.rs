use async_trait::async_trait;

use crate::BackendError;

/// One request to a text-generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Optional system instruction (used by the critic's judge persona)
    pub system: Option<String>,
    /// User-role prompt text
    pub prompt: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Token budget for the response
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            temperature,
            max_tokens,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// The core abstraction over a text-generation service.
///
/// A backend performs exactly one outbound request/response call per
/// `complete` invocation. Retry policy lives in the refinement loop, not
/// here.
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Human-readable backend name, e.g. "openai"
    fn name(&self) -> &str;

    /// Send one completion request, returning the generated text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError>;
}
