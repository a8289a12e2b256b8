//! Deterministic text processing for emergency triage
//!
//! Everything here is pure and synchronous:
//! - **Keyword tables**: versioned English and Arabic phrase lists
//! - **Critical detector**: per-utterance escalation signal
//! - **Severity classifier**: rule-based classification with safety overrides
//! - **Answer parsing**: yes/no and number answers for fixed-form questions
//! - **Heuristic extraction**: regex fact extraction from caller messages

pub mod answers;
pub mod classifier;
pub mod detector;
pub mod extraction;
pub mod keywords;
mod phrases;

pub use answers::{parse_bool, parse_number};
pub use classifier::{SafetyFacts, SeverityClassifier};
pub use detector::{detect_critical, CriticalKeywordDetector, EscalationSignal};
pub use extraction::{summarize_situation, HeuristicExtractor};
pub use keywords::KEYWORD_TABLE_VERSION;
