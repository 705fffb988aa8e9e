use serde::{Deserialize, Serialize};

/// One generated candidate story for a given round.
///
/// Drafts are superseded, never mutated: each refinement round produces a
/// fresh draft with the next round index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    /// The story text as returned by the generator
    pub text: String,
    /// Zero-indexed round that produced this draft
    pub round_index: usize,
}

impl Draft {
    pub fn new(text: impl Into<String>, round_index: usize) -> Self {
        Self {
            text: text.into(),
            round_index,
        }
    }
}
