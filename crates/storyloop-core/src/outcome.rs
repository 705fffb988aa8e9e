use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::RoundRecord;

/// The final result of a refinement loop, handed to the output collaborator.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StoryOutcome {
    /// A story was produced. `degraded` is false only when the critic
    /// explicitly accepted it; budget exhaustion and the critic fallback
    /// both set it.
    Completed {
        final_text: String,
        /// Round index (0-based) of the final draft
        rounds: usize,
        degraded: bool,
        #[serde(skip)]
        history: Vec<RoundRecord>,
        total_duration_secs: f64,
    },
    /// Caller cancelled; no text is returned
    Cancelled {
        rounds: usize,
        total_duration_secs: f64,
    },
}

impl StoryOutcome {
    pub fn completed(
        final_text: String,
        rounds: usize,
        degraded: bool,
        history: Vec<RoundRecord>,
        duration: Duration,
    ) -> Self {
        Self::Completed {
            final_text,
            rounds,
            degraded,
            history,
            total_duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn cancelled(rounds: usize, duration: Duration) -> Self {
        Self::Cancelled {
            rounds,
            total_duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn final_text(&self) -> Option<&str> {
        match self {
            Self::Completed { final_text, .. } => Some(final_text),
            Self::Cancelled { .. } => None,
        }
    }

    pub fn rounds(&self) -> usize {
        match self {
            Self::Completed { rounds, .. } => *rounds,
            Self::Cancelled { rounds, .. } => *rounds,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Completed { degraded: true, .. })
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Completed { degraded: false, .. } => 0,
            Self::Completed { degraded: true, .. } => 1,
            Self::Cancelled { .. } => 130,
        }
    }
}
