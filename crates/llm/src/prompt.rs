//! Prompt Building and Management
//!
//! Constructs the three prompts the engine sends to remote models:
//! next-turn conversation, live fact extraction and single-shot classification.

use serde::{Deserialize, Serialize};
use std::fmt;

use triage_core::{Turn, TurnRole, COMPLETION_MARKER};

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

impl From<TurnRole> for Role {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::System => Role::System,
            TurnRole::User => Role::User,
            TurnRole::Assistant => Role::Assistant,
        }
    }
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        Message::new(turn.role.into(), turn.content.clone())
    }
}

/// Instruction sent ahead of every dialogue
pub fn conversation_system_prompt() -> String {
    format!(
        r#"You are the intake operator on a disaster emergency triage line. The person talking to you is at the scene: a caller, a relative or a field operator.

Rules:
- Ask ONE short question per reply. Acknowledge what you just heard in a few words first.
- Never give medical advice, first aid steps or treatment instructions. If asked, say a trained human responder will contact them immediately.
- Collect, in roughly this order: what happened, is the person breathing, are they conscious, exact location, heavy bleeding, patient name, age, trapped or not, disaster type, number of victims, nearby dangers.
- Stop as soon as you know what happened, breathing, consciousness and location plus a couple of other details, or after about eight questions.

When you stop, reply with one closing sentence, then a line containing exactly {marker} and then a single JSON object with these keys:
patient_name, age, is_conscious, is_breathing, has_heavy_bleeding, is_trapped, location, situation_description, disaster_type, num_victims, environmental_dangers, severity (CRITICAL, HIGH, MODERATE or LOW), confidence (0.0-1.0), detected_risk_factors (array of strings), reasoning, estimated_response_priority (1-10, 1 most urgent), needs_human_callback (always true).
Use null for anything you do not know. Do not guess."#,
        marker = COMPLETION_MARKER
    )
}

/// Appended when an operator ends an interview early
pub const WRAP_UP_INSTRUCTION: &str = "The operator has ended the interview. Do not ask anything else. \
Close now with your final sentence, the completion marker line and the JSON summary of what you know.";

/// Instruction for live fact extraction
pub const EXTRACTION_PROMPT: &str = r#"Extract emergency facts from the conversation below. Reply with ONLY a JSON object, no prose, using these keys:
patient_name, age, gender, is_conscious, is_breathing, has_heavy_bleeding, location, is_trapped, indoor_outdoor, situation_description, disaster_type, num_victims, environmental_dangers.
Use true/false only when the caller said so explicitly, otherwise null. Numbers must be numbers."#;

/// Instruction for single-shot classification
pub const CLASSIFICATION_PROMPT: &str = r#"You are a disaster triage classifier. Given an emergency report, reply with ONLY a JSON object:
{"severity": "CRITICAL|HIGH|MODERATE|LOW", "confidence": 0.0-1.0, "detected_risk_factors": ["..."], "reasoning": "...", "estimated_response_priority": 1-10, "needs_human_callback": true}
CRITICAL: not breathing, no pulse, unconscious, massive bleeding, crush injury. HIGH: fractures, chest pain, head injury, heavy bleeding, trapped. MODERATE: wounds, sprains, moderate pain. LOW: bruises, anxiety, minor scrapes.
Children, the elderly, pregnant or disabled people raise severity. Do not give medical advice."#;

/// Prompt builder for the engine's remote calls
pub struct PromptBuilder;

impl PromptBuilder {
    /// System prompt followed by the transcript
    pub fn conversation(turns: &[Turn]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(Message::new(Role::System, conversation_system_prompt()));
        messages.extend(turns.iter().map(Message::from));
        messages
    }

    /// Extraction prompt over a rendered transcript window
    pub fn extraction(transcript_window: &str) -> Vec<Message> {
        vec![
            Message::new(Role::System, EXTRACTION_PROMPT),
            Message::new(
                Role::User,
                format!("Conversation:\n{}\n\nJSON:", transcript_window),
            ),
        ]
    }

    /// Classification prompt over an enriched report text
    pub fn classification(report_text: &str) -> Vec<Message> {
        vec![
            Message::new(Role::System, CLASSIFICATION_PROMPT),
            Message::new(Role::User, report_text.to_string()),
        ]
    }
}

/// Strip a surrounding Markdown code fence (```json ... ```), if present
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_prompt_mentions_marker() {
        let prompt = conversation_system_prompt();
        assert!(prompt.contains(COMPLETION_MARKER));
        assert!(prompt.contains("needs_human_callback"));
    }

    #[test]
    fn test_conversation_messages_order() {
        let turns = vec![Turn::assistant("Hello"), Turn::user("There was an explosion")];
        let messages = PromptBuilder::conversation(&turns);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[2].content, "There was an explosion");
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}"), "{\"a\":1}");
    }
}
