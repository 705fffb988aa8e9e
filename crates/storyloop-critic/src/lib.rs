//! # storyloop-critic
//!
//! Critique of story drafts.
//!
//! The critic judges a draft on two axes: appropriateness (no disallowed
//! content for the target audience) and fidelity to the requested mood,
//! setting, and length. The live implementation asks the text backend to act
//! as a judge and parses its structured JSON report into a [`Verdict`].

mod critic;
mod prompts;
mod report;
mod verdict;

pub use critic::{Critic, StoryCritic, MIN_QUALITY_SCORE};
pub use prompts::CriticPrompts;
pub use report::{JudgeReport, ReportParseError};
pub use verdict::Verdict;
