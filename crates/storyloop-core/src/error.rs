use thiserror::Error;

use storyloop_prompt::PromptError;

/// Fatal failures that unwind out of the refinement loop.
///
/// Retryable stage errors are handled inside the loop; anything surfacing
/// here terminated the request without a usable story.
#[derive(Error, Debug)]
pub enum LoopError {
    #[error("Invalid story parameters: {0}")]
    InvalidParameters(#[from] PromptError),

    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    #[error("Generation service unavailable: {0}")]
    GenerationUnavailable(String),
}

impl LoopError {
    pub fn exit_code(&self) -> i32 {
        2
    }
}
