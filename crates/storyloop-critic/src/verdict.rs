use serde::{Deserialize, Serialize};

/// The critic's pass/fail judgment for one draft.
///
/// Feedback is empty exactly when the draft is accepted; a rejection always
/// carries actionable feedback for the next refinement round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub accepted: bool,
    pub feedback: String,
}

impl Verdict {
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            feedback: String::new(),
        }
    }

    pub fn rejected(feedback: impl Into<String>) -> Self {
        Self {
            accepted: false,
            feedback: feedback.into(),
        }
    }

    /// Short description for logging
    pub fn short_description(&self) -> String {
        if self.accepted {
            "ACCEPTED".to_string()
        } else {
            format!("REJECTED ({} chars of feedback)", self.feedback.len())
        }
    }
}
