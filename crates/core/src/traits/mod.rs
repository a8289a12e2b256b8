//! Collaborator traits for the triage engine
//!
//! The engine talks to the outside world only through these seams:
//!
//! ```text
//! Speech:
//!   - SpeechTranscoder: audio bytes <-> plain text
//!
//! Reports:
//!   - ReportStore: persist a finalized report, returning its identifier
//! ```
//!
//! Implementations live with the channel adapters; tests use in-process doubles.

mod speech;
mod store;

pub use speech::SpeechTranscoder;
pub use store::ReportStore;
