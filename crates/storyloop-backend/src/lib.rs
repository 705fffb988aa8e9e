//! # storyloop-backend
//!
//! Backend abstraction for text generation.
//!
//! The [`TextBackend`] trait models one request/response call to a
//! text-generation service; [`OpenAiBackend`] is the live implementation for
//! OpenAI-compatible chat-completion endpoints. [`Generator`] is the
//! story-drafting capability the refinement loop depends on, so the loop can
//! be exercised with deterministic doubles instead of a network.

mod credentials;
mod error;
mod generator;
mod openai;
mod options;
mod traits;

pub use credentials::resolve_api_key;
pub use error::BackendError;
pub use generator::{Generator, StoryGenerator};
pub use openai::OpenAiBackend;
pub use options::GenerationOptions;
pub use traits::{CompletionRequest, TextBackend};
