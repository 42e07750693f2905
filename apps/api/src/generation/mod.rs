// Content generation: prompt → model → validated artifact, with a deterministic
// fallback whenever the model path degrades.
// All model calls go through llm_client; no direct Gemini calls here.

pub mod fallback;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod response;
pub mod worker;

use thiserror::Error;

use crate::llm_client::LlmError;

/// Why the model path was abandoned for the fallback. Never returned to callers.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("model response is not the expected JSON object: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("model left '{0}' empty")]
    EmptyField(&'static str),

    #[error("lyrics contain no [section] markers")]
    MissingSections,
}
