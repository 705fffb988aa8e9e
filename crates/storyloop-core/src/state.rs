use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use storyloop_critic::Verdict;
use storyloop_prompt::{Draft, PromptBuilder, PromptError, StoryParameters};

/// Default cap on generator calls per request.
pub const DEFAULT_MAX_ROUNDS: usize = 3;

/// One completed round: the draft and the verdict it received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRecord {
    pub draft: Draft,
    pub verdict: Verdict,
    pub timestamp: DateTime<Utc>,
}

impl RoundRecord {
    pub fn new(draft: Draft, verdict: Verdict) -> Self {
        Self {
            draft,
            verdict,
            timestamp: Utc::now(),
        }
    }
}

/// All mutable state for one story request.
///
/// Owned exclusively by the refinement loop; concurrent requests each carry
/// their own value, so no locking is needed anywhere. Invariants while a
/// round is in flight: `history.len() == round_index` and the current
/// draft's `round_index` equals `round_index`.
#[derive(Debug, Clone)]
pub struct RefinementState {
    /// The user's request, fixed for the lifetime of the loop
    pub params: StoryParameters,
    /// Draft produced by the current round, if any
    pub current_draft: Option<Draft>,
    /// Rejected rounds, oldest first
    pub history: Vec<RoundRecord>,
    /// Current round (0-indexed)
    pub round_index: usize,
    /// Cap on generator calls
    pub max_rounds: usize,
    /// Feedback from the most recent rejection
    last_feedback: Option<String>,
    started_at: Instant,
}

impl RefinementState {
    pub fn new(params: StoryParameters) -> Self {
        Self {
            params,
            current_draft: None,
            history: Vec::new(),
            round_index: 0,
            max_rounds: DEFAULT_MAX_ROUNDS,
            last_feedback: None,
            started_at: Instant::now(),
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    /// Prompt for the current round: the initial prompt on round 0, a
    /// refinement prompt threading back the last rejection afterwards.
    pub fn current_prompt(&self) -> Result<String, PromptError> {
        match (&self.current_draft, &self.last_feedback) {
            (Some(draft), Some(feedback)) => {
                PromptBuilder::build_refinement_prompt(draft, feedback, &self.params)
            }
            _ => PromptBuilder::build_initial_prompt(&self.params),
        }
    }

    /// Whether another round may start after the current one is rejected.
    pub fn budget_remaining(&self) -> bool {
        self.round_index + 1 < self.max_rounds
    }

    /// Install the draft produced by the current round.
    pub fn set_draft(&mut self, draft: Draft) {
        debug_assert_eq!(draft.round_index, self.round_index);
        debug_assert_eq!(self.history.len(), self.round_index);
        self.current_draft = Some(draft);
    }

    /// Record a rejection and advance to the next round.
    pub fn record_rejection(&mut self, draft: Draft, verdict: Verdict) {
        debug_assert!(!verdict.accepted);
        self.last_feedback = Some(verdict.feedback.clone());
        self.current_draft = Some(draft.clone());
        self.history.push(RoundRecord::new(draft, verdict));
        self.round_index += 1;
        debug_assert_eq!(self.history.len(), self.round_index);
    }

    pub fn total_duration(&self) -> Duration {
        self.started_at.elapsed()
    }
}
