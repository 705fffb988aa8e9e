use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use storyloop_backend::{BackendError, Generator};
use storyloop_critic::{Critic, Verdict};
use storyloop_logging::{LogEvent, Logger, StageRole};
use storyloop_prompt::Draft;

use crate::state_machine::{LoopState, RoundEvent};
use crate::{LoopError, RefinementState, RoundRecord, StoryOutcome};

/// Orchestrates the generator-critic refinement loop
pub struct RefinementLoop<'a> {
    generator: &'a dyn Generator,
    critic: &'a dyn Critic,
    logger: Arc<Logger>,
    cancelled: Arc<AtomicBool>,
}

impl<'a> RefinementLoop<'a> {
    pub fn new(generator: &'a dyn Generator, critic: &'a dyn Critic, logger: Arc<Logger>) -> Self {
        Self {
            generator,
            critic,
            logger,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a handle to signal cancellation
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Run the refinement loop to completion.
    ///
    /// Best-effort policy: an exhausted round budget still returns the last
    /// draft (flagged degraded) rather than an error, so the user's input is
    /// never lost to a picky critic.
    pub async fn run(&self, mut state: RefinementState) -> Result<StoryOutcome, LoopError> {
        // Surface bad parameters before any network call is dispatched.
        state.params.validate()?;

        self.logger.log(&LogEvent::LoopStarted {
            character_name: state.params.character_name.clone(),
            setting: state.params.setting.clone(),
            mood: state.params.mood.clone(),
            max_rounds: state.max_rounds,
        });

        let mut phase = LoopState::Drafting;

        loop {
            debug_assert!(!phase.is_terminal());

            // Cancellation is observed at dispatch points only; once seen,
            // no further backend calls are made.
            if self.cancelled.load(Ordering::SeqCst) {
                return Ok(self.cancel(&state));
            }

            let round = state.round_index;
            let prompt = state.current_prompt()?;

            self.logger.log(&LogEvent::GeneratorStarted {
                round,
                prompt_preview: prompt.chars().take(100).collect(),
            });

            let started = Instant::now();
            let draft = match self.generate_with_retry(&prompt, round).await {
                Ok(draft) => draft,
                Err(e) => {
                    phase = phase.step(RoundEvent::FatalError);
                    debug_assert!(phase.is_terminal());
                    self.logger.log(&LogEvent::ErrorEncountered {
                        round,
                        error: e.to_string(),
                    });
                    return Err(e);
                }
            };
            phase = phase.step(RoundEvent::DraftProduced);

            self.logger.log(&LogEvent::GeneratorCompleted {
                round,
                draft_chars: draft.text.len(),
                duration_secs: started.elapsed().as_secs_f64(),
            });
            state.set_draft(draft.clone());

            if self.cancelled.load(Ordering::SeqCst) {
                return Ok(self.cancel(&state));
            }

            self.logger.log(&LogEvent::CriticStarted { round });

            let verdict = match self.critique_with_retry(&draft, &state).await {
                Ok(verdict) => verdict,
                Err(BackendError::Auth(message)) => {
                    phase = phase.step(RoundEvent::FatalError);
                    self.logger.log(&LogEvent::ErrorEncountered {
                        round,
                        error: message.clone(),
                    });
                    return Err(LoopError::AuthFailure(message));
                }
                Err(e) => {
                    // Accept-by-default fallback: after a failed retry the
                    // draft stands, flagged degraded so callers can tell it
                    // apart from a clean acceptance.
                    warn!(round, error = %e, "Critic unavailable, accepting draft by default");
                    self.logger.log(&LogEvent::CriticFallback {
                        round,
                        reason: e.to_string(),
                    });
                    phase = phase.step(RoundEvent::VerdictAccepted);
                    debug_assert!(phase.is_terminal());
                    return Ok(self.complete(&state, draft, None, true));
                }
            };

            self.logger.log(&LogEvent::CriticCompleted {
                round,
                verdict: verdict.short_description(),
            });

            if verdict.accepted {
                phase = phase.step(RoundEvent::VerdictAccepted);
                debug_assert!(phase.is_terminal());
                return Ok(self.complete(&state, draft, Some(verdict), false));
            }

            let budget_remaining = state.budget_remaining();
            phase = phase.step(RoundEvent::VerdictRejected { budget_remaining });

            if !budget_remaining {
                debug_assert!(phase.is_terminal());
                self.logger
                    .log(&LogEvent::RoundBudgetExhausted { rounds: round });
                return Ok(self.complete(&state, draft, Some(verdict), true));
            }

            info!(
                round,
                feedback_chars = verdict.feedback.len(),
                "Draft rejected, refining"
            );
            state.record_rejection(draft, verdict);
            phase = phase.step(RoundEvent::RefinementPrepared);
        }
    }

    /// One generator call plus a single in-stage retry for retryable errors.
    async fn generate_with_retry(&self, prompt: &str, round: usize) -> Result<Draft, LoopError> {
        match self.generator.generate(prompt, round).await {
            Ok(draft) => Ok(draft),
            Err(BackendError::Auth(message)) => Err(LoopError::AuthFailure(message)),
            Err(e) => {
                debug!(round, error = %e, "Generator failed, retrying once");
                self.logger.log(&LogEvent::StageRetried {
                    round,
                    stage: StageRole::Generator,
                    reason: e.to_string(),
                });
                self.generator
                    .generate(prompt, round)
                    .await
                    .map_err(|e| match e {
                        BackendError::Auth(message) => LoopError::AuthFailure(message),
                        other => LoopError::GenerationUnavailable(other.to_string()),
                    })
            }
        }
    }

    /// One critic call plus a single retry; the post-retry error is returned
    /// so the caller can apply the accept-by-default policy.
    async fn critique_with_retry(
        &self,
        draft: &Draft,
        state: &RefinementState,
    ) -> Result<Verdict, BackendError> {
        match self.critic.critique(draft, &state.params).await {
            Ok(verdict) => Ok(verdict),
            Err(e @ BackendError::Auth(_)) => Err(e),
            Err(e) => {
                debug!(round = draft.round_index, error = %e, "Critic failed, retrying once");
                self.logger.log(&LogEvent::StageRetried {
                    round: draft.round_index,
                    stage: StageRole::Critic,
                    reason: e.to_string(),
                });
                self.critic.critique(draft, &state.params).await
            }
        }
    }

    fn complete(
        &self,
        state: &RefinementState,
        draft: Draft,
        verdict: Option<Verdict>,
        degraded: bool,
    ) -> StoryOutcome {
        let duration = state.total_duration();
        self.logger.log(&LogEvent::LoopCompleted {
            rounds: draft.round_index,
            degraded,
            duration_secs: duration.as_secs_f64(),
        });

        let mut history = state.history.clone();
        if let Some(verdict) = verdict {
            history.push(RoundRecord::new(draft.clone(), verdict));
        }
        StoryOutcome::completed(draft.text, draft.round_index, degraded, history, duration)
    }

    fn cancel(&self, state: &RefinementState) -> StoryOutcome {
        info!(round = state.round_index, "Loop cancelled by caller");
        self.logger.log(&LogEvent::Cancelled {
            round: state.round_index,
        });
        StoryOutcome::cancelled(state.round_index, state.total_duration())
    }
}
