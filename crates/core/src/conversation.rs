//! Conversation turns and transcript rendering

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::completion::COMPLETION_MARKER;

/// Speaker of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// Caller or operator relaying the emergency
    User,
    /// Triage agent
    Assistant,
    /// Instructions to the generation backend, never shown to the caller
    System,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
            TurnRole::System => "system",
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single turn in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(TurnRole::System, content)
    }
}

/// Render the human-visible part of a conversation.
///
/// User lines are prefixed `Caller:`, assistant lines `AI:`. System turns
/// are omitted, as is any structured payload after a completion marker.
pub fn render_transcript(turns: &[Turn]) -> String {
    turns
        .iter()
        .filter_map(|turn| match turn.role {
            TurnRole::User => Some(format!("Caller: {}", turn.content.trim())),
            TurnRole::Assistant => {
                let visible = turn
                    .content
                    .split(COMPLETION_MARKER)
                    .next()
                    .unwrap_or_default()
                    .trim();
                (!visible.is_empty()).then(|| format!("AI: {}", visible))
            }
            TurnRole::System => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_hides_system_and_payload() {
        let turns = vec![
            Turn::system("You are a triage operator."),
            Turn::assistant("Hello, what's happening?"),
            Turn::user("My father collapsed"),
            Turn::assistant(format!("Thank you.\n{}\n{{\"severity\":\"HIGH\"}}", COMPLETION_MARKER)),
        ];
        let rendered = render_transcript(&turns);
        assert_eq!(
            rendered,
            "AI: Hello, what's happening?\nCaller: My father collapsed\nAI: Thank you."
        );
    }
}
