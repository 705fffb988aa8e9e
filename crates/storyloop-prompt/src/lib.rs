//! # storyloop-prompt
//!
//! Story parameters and prompt construction.
//!
//! Everything in this crate is pure: building a prompt never touches the
//! network, and identical inputs always produce identical prompt text.
//!
//! ## Key Types
//!
//! - [`StoryParameters`] - User-supplied narrative parameters
//! - [`Draft`] - One generated candidate story for a round
//! - [`PromptBuilder`] - Initial and refinement prompt templates
//! - [`PromptError`] - Validation failures

mod builder;
mod draft;
mod params;

pub use builder::{PromptBuilder, PromptError};
pub use draft::Draft;
pub use params::StoryParameters;
