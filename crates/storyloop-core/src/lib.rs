//! # storyloop-core
//!
//! Orchestration of the generator-critic refinement loop.
//!
//! A single story request flows strictly sequentially: prompt, draft,
//! verdict, and (on rejection) a refinement prompt threading the critique
//! back into the next draft. The loop owns all per-request state in a
//! [`RefinementState`]; nothing is shared between concurrent requests.

mod error;
mod outcome;
mod runner;
mod state;
mod state_machine;

pub use error::LoopError;
pub use outcome::StoryOutcome;
pub use runner::RefinementLoop;
pub use state::{RefinementState, RoundRecord, DEFAULT_MAX_ROUNDS};
pub use state_machine::{LoopState, RoundEvent};
