//! Remote generation backends for the triage engine
//!
//! Features:
//! - `LlmBackend` trait over chat-completion style APIs
//! - OpenAI-compatible backend with Groq and Minimax presets
//! - Conversation, extraction and classification prompts
//! - Factory building backends from settings
//!
//! Every failure maps onto [`LlmError`], which callers use to decide whether
//! to fall through to the next provider. Nothing here retries.

pub mod backend;
pub mod factory;
pub mod prompt;

pub use backend::{FinishReason, GenerationResult, LlmBackend, OpenAIBackend, OpenAIConfig};
pub use factory::LlmFactory;
pub use prompt::{strip_code_fences, Message, PromptBuilder, Role};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    /// Backend unreachable or connection dropped
    #[error("Network error: {0}")]
    Network(String),

    /// Call exceeded its deadline
    #[error("Timeout")]
    Timeout,

    /// Non-2xx status, or an error reported inside the body
    #[error("API error: {0}")]
    Api(String),

    /// Body could not be decoded or lacked a choice
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Decoded fine but carried no text
    #[error("Empty response")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl LlmError {
    /// Transport-level failures (network, timeout)
    pub fn is_transport(&self) -> bool {
        matches!(self, LlmError::Network(_) | LlmError::Timeout)
    }

    /// Short label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Network(_) => "network",
            LlmError::Timeout => "timeout",
            LlmError::Api(_) => "api",
            LlmError::InvalidResponse(_) => "invalid_response",
            LlmError::EmptyResponse => "empty",
            LlmError::Configuration(_) => "configuration",
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_decode() {
            LlmError::InvalidResponse(err.to_string())
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for triage_core::Error {
    fn from(err: LlmError) -> Self {
        triage_core::Error::Llm(err.to_string())
    }
}
