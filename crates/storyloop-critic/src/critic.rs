use async_trait::async_trait;
use storyloop_backend::{BackendError, CompletionRequest, TextBackend};
use storyloop_prompt::{Draft, StoryParameters};
use tracing::{debug, info};

use crate::{CriticPrompts, JudgeReport, Verdict};

/// Minimum judge quality score for a draft to be accepted.
pub const MIN_QUALITY_SCORE: u8 = 7;

// Judge calls are deterministic and short.
const JUDGE_TEMPERATURE: f32 = 0.0;
const JUDGE_MAX_TOKENS: u32 = 400;

/// The draft-evaluation capability.
///
/// Polymorphic over implementation so loop tests can script verdicts
/// directly.
#[async_trait]
pub trait Critic: Send + Sync {
    /// Judge one draft against the original request.
    async fn critique(
        &self,
        draft: &Draft,
        params: &StoryParameters,
    ) -> Result<Verdict, BackendError>;
}

/// Live critic that runs the judge persona on a [`TextBackend`].
pub struct StoryCritic<'a> {
    backend: &'a dyn TextBackend,
    min_quality: u8,
}

impl<'a> StoryCritic<'a> {
    pub fn new(backend: &'a dyn TextBackend) -> Self {
        Self {
            backend,
            min_quality: MIN_QUALITY_SCORE,
        }
    }

    pub fn with_min_quality(mut self, min_quality: u8) -> Self {
        self.min_quality = min_quality;
        self
    }
}

#[async_trait]
impl Critic for StoryCritic<'_> {
    async fn critique(
        &self,
        draft: &Draft,
        params: &StoryParameters,
    ) -> Result<Verdict, BackendError> {
        debug!(
            backend = self.backend.name(),
            round = draft.round_index,
            draft_chars = draft.text.len(),
            "Running judge"
        );

        let request = CompletionRequest::new(
            CriticPrompts::build_judge_prompt(draft, params),
            JUDGE_TEMPERATURE,
            JUDGE_MAX_TOKENS,
        )
        .with_system(CriticPrompts::judge_system_prompt());

        let output = self.backend.complete(&request).await?;

        // An unparseable report counts as a transient failure so the loop's
        // single critic retry applies.
        let report = JudgeReport::parse(&output)
            .map_err(|e| BackendError::Transient(format!("judge report unusable: {}", e)))?;

        let verdict = report.into_verdict(self.min_quality);
        info!(
            round = draft.round_index,
            verdict = %verdict.short_description(),
            "Judge completed"
        );
        Ok(verdict)
    }
}
