use std::time::Duration;

/// Pass-through generation options.
///
/// The loop never interprets these; they travel to the backend unchanged.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Model identifier, e.g. "gpt-3.5-turbo"
    pub model: String,
    /// Sampling temperature for story drafts
    pub temperature: f32,
    /// Token budget per draft
    pub max_tokens: u32,
    /// Per-call timeout; exceeding it surfaces as a transient failure
    pub timeout: Duration,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.5,
            max_tokens: 3000,
            timeout: Duration::from_secs(30),
        }
    }
}

impl GenerationOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
