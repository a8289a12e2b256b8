//! Conversational triage engine
//!
//! Features:
//! - Session registry for free-form dialogues and structured interviews
//! - Provider chain: remote dialogue backends first, local policy last
//! - Live fact extraction running beside every turn
//! - Completion marker parsing with lenient repair
//! - Report finalization, storage and event publishing
//! - Idle session cleanup

pub mod completion;
pub mod dialogue;
pub mod engine;
pub mod events;
pub mod extractor;
pub mod interview;
pub mod orchestrator;
pub mod policy;
pub mod provider;
pub mod registry;
pub mod store;

pub use completion::{Completion, CompletionParser, ParseFailure};
pub use dialogue::{DialogueSession, DialogueSnapshot};
pub use engine::{
    EngineBuilder, FiledReport, InterviewOutcome, TextTriageRequest, TriageEngine, TurnOutcome,
    KEYWORD_CLASSIFIER,
};
pub use events::{EngineEvent, EventBus, SessionKind};
pub use extractor::LiveExtractor;
pub use interview::{Answer, InterviewStep, StructuredInterview};
pub use orchestrator::{FinalReply, ProviderChain, TurnReply, GREETING, LOCAL_PROVIDER};
pub use policy::{LocalDialoguePolicy, PolicyDecision};
pub use provider::{DialogueProvider, RemoteDialogueProvider};
pub use registry::SessionRegistry;
pub use store::InMemoryReportStore;

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    /// Unknown or already finalized session; adapters start a new one
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Dialogue operation on an interview, or the reverse
    #[error("Session {0} is of a different kind")]
    WrongSessionKind(String),

    #[error("Session capacity reached ({0})")]
    CapacityExceeded(usize),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Core(#[from] triage_core::Error),
}

impl From<triage_llm::LlmError> for AgentError {
    fn from(err: triage_llm::LlmError) -> Self {
        AgentError::Core(err.into())
    }
}
