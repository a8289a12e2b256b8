//! Free-form dialogue session
//!
//! Owned by the registry behind a per-session async mutex. Remote calls only
//! ever see a [`DialogueSnapshot`], never the live session.

use chrono::{DateTime, Utc};

use triage_core::{render_transcript, Classification, FactRecord, InputSource, Turn, TurnRole};

/// Mutable state of one conversation
#[derive(Debug, Clone)]
pub struct DialogueSession {
    pub id: String,
    pub turns: Vec<Turn>,
    pub is_complete: bool,
    /// Final facts, set on completion
    pub facts: Option<FactRecord>,
    /// Final classification, set on completion
    pub classification: Option<Classification>,
    /// Partial facts merged after every turn
    pub live_facts: FactRecord,
    /// Provider that authored the latest assistant turn
    pub provider: Option<String>,
    pub source: InputSource,
    pub created_at: DateTime<Utc>,
}

impl DialogueSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            turns: Vec::new(),
            is_complete: false,
            facts: None,
            classification: None,
            live_facts: FactRecord::default(),
            provider: None,
            source: InputSource::Chat,
            created_at: Utc::now(),
        }
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::user(text));
    }

    pub fn push_assistant(&mut self, text: impl Into<String>, provider: impl Into<String>) {
        self.turns.push(Turn::assistant(text));
        self.provider = Some(provider.into());
    }

    pub fn user_turn_count(&self) -> usize {
        count_user_turns(&self.turns)
    }

    pub fn user_texts(&self) -> Vec<&str> {
        user_texts(&self.turns)
    }

    /// Caller-visible transcript
    pub fn transcript(&self) -> String {
        render_transcript(&self.turns)
    }

    /// Immutable view handed to providers and the extractor
    pub fn snapshot(&self) -> DialogueSnapshot {
        DialogueSnapshot {
            session_id: self.id.clone(),
            turns: self.turns.clone(),
            live_facts: self.live_facts.clone(),
        }
    }
}

/// Point-in-time copy of a dialogue
#[derive(Debug, Clone, Default)]
pub struct DialogueSnapshot {
    pub session_id: String,
    pub turns: Vec<Turn>,
    pub live_facts: FactRecord,
}

impl DialogueSnapshot {
    pub fn user_turn_count(&self) -> usize {
        count_user_turns(&self.turns)
    }

    pub fn user_texts(&self) -> Vec<&str> {
        user_texts(&self.turns)
    }

    /// Copy with an extra system instruction appended
    pub fn with_instruction(&self, instruction: &str) -> Self {
        let mut snapshot = self.clone();
        snapshot.turns.push(Turn::system(instruction));
        snapshot
    }
}

fn count_user_turns(turns: &[Turn]) -> usize {
    turns.iter().filter(|t| t.role == TurnRole::User).count()
}

fn user_texts(turns: &[Turn]) -> Vec<&str> {
    turns
        .iter()
        .filter(|t| t.role == TurnRole::User)
        .map(|t| t.content.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_detached() {
        let mut session = DialogueSession::new("s1");
        session.push_assistant("What happened?", "local");
        session.push_user("My father fell");
        let snapshot = session.snapshot();

        session.push_user("He is bleeding");
        assert_eq!(snapshot.user_turn_count(), 1);
        assert_eq!(session.user_turn_count(), 2);
        assert_eq!(session.provider.as_deref(), Some("local"));
    }

    #[test]
    fn test_instruction_not_counted_as_user_turn() {
        let mut session = DialogueSession::new("s1");
        session.push_user("help");
        let wrapped = session.snapshot().with_instruction("finish now");
        assert_eq!(wrapped.user_turn_count(), 1);
        assert_eq!(wrapped.turns.last().map(|t| t.role), Some(TurnRole::System));
        assert_eq!(session.transcript(), "Caller: help");
    }
}
