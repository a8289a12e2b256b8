//! Core types and traits for the triage engine
//!
//! This crate provides the foundational types used across all other crates:
//! - Severity scale and classification
//! - Fact record (tri-state case attributes)
//! - Conversation turns and transcript rendering
//! - Structured interview question set
//! - Completion marker contract
//! - Collaborator traits (speech transcoder, report store)
//! - Error types

pub mod classification;
pub mod completion;
pub mod conversation;
pub mod error;
pub mod facts;
pub mod interview;
pub mod report;
pub mod severity;
pub mod traits;

pub use classification::{Classification, UNPARSED_REASONING};
pub use completion::{CompletionPayload, COMPLETION_MARKER};
pub use conversation::{render_transcript, Turn, TurnRole};
pub use error::{Error, Result};
pub use facts::{FactRecord, VitalSign, VitalSigns, MAX_AGE};
pub use interview::{AnswerKind, Question, QuestionId, QUESTIONS, QUESTION_COUNT};
pub use report::{InputSource, TriageReport};
pub use severity::Severity;
pub use traits::{ReportStore, SpeechTranscoder};
