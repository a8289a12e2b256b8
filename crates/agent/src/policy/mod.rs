//! Local dialogue policy
//!
//! Deterministic last element of the provider chain. It never fails and
//! never calls out, so a session keeps moving with every backend down.
//!
//! Decision order for each turn:
//! 1. nothing said yet: ask what is happening
//! 2. hard turn ceiling reached: complete
//! 3. essentials covered plus enough extra detail or turns: complete
//! 4. caller asks for medical advice: decline, then ask the next question
//! 5. bare greeting: ask for the emergency
//! 6. vague message: ask for a description
//! 7. otherwise: acknowledge, then ask the highest-priority open topic

pub mod topics;

use std::collections::BTreeSet;

use triage_config::DialogueConfig;
use triage_core::{Classification, CompletionPayload, FactRecord, COMPLETION_MARKER};
use triage_text_processing::{HeuristicExtractor, SeverityClassifier};
use unicode_segmentation::UnicodeSegmentation;

use crate::dialogue::DialogueSnapshot;
pub use topics::{covered_topics, expand_contextual_answers, Topic, TOPIC_PRIORITY};

/// Reply when there is nothing to go on yet
pub const OPENING_PROMPT: &str = "Can you tell me what's happening?";

/// Reply to a request for medical advice
pub const MEDICAL_DECLINE: &str =
    "A trained human responder will contact you immediately. Please stay calm and stay on the line.";

/// Closing sentence of a locally completed interview
pub const LOCAL_CLOSING: &str =
    "Thank you. I've logged this case and a human responder will follow up shortly. Stay safe.";

const GREETING_PROMPT: &str =
    "I'm here to help. Please tell me what is happening. What is the emergency?";

const VAGUE_PROMPT: &str =
    "I want to make sure I understand. Can you describe what happened in a bit more detail?";

const BRIDGES: &[&str] = &["Okay.", "I see.", "Understood."];

const MEDICAL_PHRASES: &[&str] = &[
    "what should i do",
    "what do i do",
    "what can i do",
    "how do i treat",
    "how to treat",
    "how do i stop",
    "should i give",
    "should i move",
    "what medicine",
    "which medicine",
    "first aid",
    "cpr",
    "tourniquet",
];

const GREETING_WORDS: &[&str] = &[
    "hi", "hello", "hey", "salam", "salaam", "assalamu", "alaikum", "good", "morning",
    "evening", "afternoon", "there", "مرحبا", "السلام", "عليكم",
];

/// Outcome of one policy step
#[derive(Debug, Clone)]
pub enum PolicyDecision {
    Reply(String),
    Complete(LocalCompletion),
}

/// Locally assembled final record
#[derive(Debug, Clone)]
pub struct LocalCompletion {
    /// Closing sentence, marker line and payload
    pub reply: String,
    pub facts: FactRecord,
    pub classification: Classification,
}

/// Deterministic dialogue policy
#[derive(Debug, Clone, Default)]
pub struct LocalDialoguePolicy {
    config: DialogueConfig,
    extractor: HeuristicExtractor,
    classifier: SeverityClassifier,
}

impl LocalDialoguePolicy {
    pub fn new(config: DialogueConfig) -> Self {
        Self {
            config,
            extractor: HeuristicExtractor::new(),
            classifier: SeverityClassifier::new(),
        }
    }

    pub fn config(&self) -> &DialogueConfig {
        &self.config
    }

    /// Decide the next move for a dialogue
    pub fn decide(&self, snapshot: &DialogueSnapshot) -> PolicyDecision {
        let user_texts = expand_contextual_answers(&snapshot.turns);
        let turn = user_texts.len();
        let Some(last_raw) = snapshot.user_texts().last().map(|t| t.trim().to_lowercase()) else {
            return PolicyDecision::Reply(OPENING_PROMPT.to_string());
        };

        if turn >= self.config.max_turns {
            tracing::debug!(session_id = %snapshot.session_id, turn, "Turn ceiling reached");
            return PolicyDecision::Complete(self.complete(snapshot));
        }

        let covered = covered_topics(&user_texts);
        if self.criteria_met(&covered, turn) {
            return PolicyDecision::Complete(self.complete(snapshot));
        }

        let Some(next_question) = self.next_question(&covered, turn) else {
            return PolicyDecision::Complete(self.complete(snapshot));
        };

        if MEDICAL_PHRASES.iter().any(|p| last_raw.contains(p)) {
            return PolicyDecision::Reply(format!("{} {}", MEDICAL_DECLINE, next_question));
        }

        if is_greeting_only(&last_raw) {
            return PolicyDecision::Reply(GREETING_PROMPT.to_string());
        }

        let previous = covered_topics(&user_texts[..turn - 1]);
        let mut newly_covered: Vec<Topic> = covered.difference(&previous).copied().collect();

        if last_raw.unicode_words().count() <= 2
            && newly_covered.is_empty()
            && !covered.contains(&Topic::Situation)
        {
            return PolicyDecision::Reply(VAGUE_PROMPT.to_string());
        }

        // Clinical facts first, then the rest in asking order
        newly_covered.sort_by_key(|topic| !topic.is_clinical());
        let ack = if newly_covered.is_empty() {
            BRIDGES[turn % BRIDGES.len()].to_string()
        } else {
            newly_covered
                .iter()
                .map(|topic| topic.acknowledgment())
                .collect::<Vec<_>>()
                .join(" ")
        };
        PolicyDecision::Reply(format!("{} {}", ack, next_question))
    }

    /// Build the final record from what the caller said so far
    pub fn complete(&self, snapshot: &DialogueSnapshot) -> LocalCompletion {
        let user_texts = expand_contextual_answers(&snapshot.turns);
        let mut facts = self.extractor.extract(&user_texts);
        facts.fill_gaps(&snapshot.live_facts);
        if !facts.has_situation() {
            facts.situation_description = Some(crate::interview::NO_DESCRIPTION.to_string());
        }

        let classification = self.classifier.classify_case(&facts);
        let reply = CompletionPayload::new(&facts, &classification)
            .render_reply(LOCAL_CLOSING)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to render completion payload");
                format!("{}\n\n{}\n{{}}", LOCAL_CLOSING, COMPLETION_MARKER)
            });

        LocalCompletion {
            reply,
            facts,
            classification,
        }
    }

    fn criteria_met(&self, covered: &BTreeSet<Topic>, turn: usize) -> bool {
        let essentials = TOPIC_PRIORITY
            .iter()
            .filter(|t| t.is_essential())
            .all(|t| covered.contains(t));
        let extras = covered.iter().filter(|t| !t.is_essential()).count();
        essentials
            && (extras >= self.config.min_extra_topics
                || turn >= self.config.min_turns_for_completion)
    }

    fn next_question(&self, covered: &BTreeSet<Topic>, turn: usize) -> Option<&'static str> {
        TOPIC_PRIORITY
            .iter()
            .find(|t| !covered.contains(t))
            .map(|topic| {
                let variants = topic.questions();
                variants[turn % variants.len()]
            })
    }
}

fn is_greeting_only(text_lower: &str) -> bool {
    let mut words = text_lower.unicode_words().peekable();
    words.peek().is_some() && words.all(|w| GREETING_WORDS.contains(&w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::{Severity, Turn};

    fn snapshot(turns: Vec<Turn>) -> DialogueSnapshot {
        DialogueSnapshot {
            session_id: "test".to_string(),
            turns,
            ..Default::default()
        }
    }

    fn reply_text(decision: PolicyDecision) -> String {
        match decision {
            PolicyDecision::Reply(text) => text,
            PolicyDecision::Complete(c) => panic!("unexpected completion: {}", c.reply),
        }
    }

    #[test]
    fn test_opening_when_nothing_said() {
        let policy = LocalDialoguePolicy::default();
        let text = reply_text(policy.decide(&snapshot(vec![])));
        assert_eq!(text, OPENING_PROMPT);
    }

    #[test]
    fn test_greeting_prompts_for_emergency() {
        let policy = LocalDialoguePolicy::default();
        let text = reply_text(policy.decide(&snapshot(vec![Turn::user("Hello there!")])));
        assert_eq!(text, GREETING_PROMPT);
    }

    #[test]
    fn test_vague_message() {
        let policy = LocalDialoguePolicy::default();
        let text = reply_text(policy.decide(&snapshot(vec![Turn::user("please hurry")])));
        assert_eq!(text, VAGUE_PROMPT);
    }

    #[test]
    fn test_acknowledges_and_asks_breathing_next() {
        let policy = LocalDialoguePolicy::default();
        let text = reply_text(policy.decide(&snapshot(vec![Turn::user(
            "There was an earthquake and my father is hurt",
        )])));
        assert!(text.starts_with("Thank you for telling me what happened."));
        assert!(text.to_lowercase().contains("breathing"));
    }

    #[test]
    fn test_acknowledges_every_new_clinical_fact() {
        let policy = LocalDialoguePolicy::default();
        let text = reply_text(policy.decide(&snapshot(vec![Turn::user(
            "he's not breathing and trapped under rubble",
        )])));
        let breathing = text.find(Topic::Breathing.acknowledgment()).unwrap();
        let trapped = text.find(Topic::Trapped.acknowledgment()).unwrap();
        let situation = text.find(Topic::Situation.acknowledgment()).unwrap();
        assert!(breathing < trapped);
        assert!(trapped < situation);
    }

    #[test]
    fn test_medical_advice_declined() {
        let policy = LocalDialoguePolicy::default();
        let text = reply_text(policy.decide(&snapshot(vec![
            Turn::user("My brother fell from the roof"),
            Turn::assistant("Is the person breathing?"),
            Turn::user("what should i do? should i give him water?"),
        ])));
        assert!(text.starts_with(MEDICAL_DECLINE));
        assert!(text.ends_with('?'));
    }

    #[test]
    fn test_completes_when_essentials_and_extras_covered() {
        let policy = LocalDialoguePolicy::default();
        let decision = policy.decide(&snapshot(vec![
            Turn::user("There was an explosion, my father is trapped and bleeding heavily"),
            Turn::assistant("Is the person breathing?"),
            Turn::user("no"),
            Turn::assistant("Is the person conscious and responding to you?"),
            Turn::user("no"),
            Turn::assistant("What is your exact location or address?"),
            Turn::user("We are at 12 Main Street"),
        ]));
        let PolicyDecision::Complete(completion) = decision else {
            panic!("expected completion");
        };
        assert_eq!(completion.facts.is_breathing, Some(false));
        assert_eq!(completion.facts.is_conscious, Some(false));
        assert_eq!(completion.classification.severity(), Severity::Critical);
        assert!(completion.reply.starts_with(LOCAL_CLOSING));
        assert!(completion.reply.contains(COMPLETION_MARKER));
    }

    #[test]
    fn test_completes_on_turn_count_with_few_extras() {
        let policy = LocalDialoguePolicy::default();
        let mut turns = vec![
            Turn::user("My father is trapped after the building shook"),
            Turn::assistant("Is the person breathing?"),
            Turn::user("yes he is breathing"),
            Turn::assistant("Is the person conscious and responding to you?"),
            Turn::user("yes he is conscious"),
            Turn::assistant("What is your exact location or address?"),
            Turn::user("We are at 12 Main Street"),
            Turn::assistant("Is there any heavy bleeding?"),
        ];

        // Essentials plus one extra: keep asking until the turn threshold
        let PolicyDecision::Reply(_) = policy.decide(&snapshot(turns.clone())) else {
            panic!("expected a question at turn 4");
        };
        turns.push(Turn::user("please hurry"));

        let PolicyDecision::Complete(completion) = policy.decide(&snapshot(turns)) else {
            panic!("expected completion at turn 5");
        };
        assert_eq!(completion.facts.is_trapped, Some(true));
        assert!(completion.reply.starts_with(LOCAL_CLOSING));
    }

    #[test]
    fn test_ceiling_forces_completion() {
        let config = DialogueConfig {
            max_turns: 3,
            ..Default::default()
        };
        let policy = LocalDialoguePolicy::new(config);
        let turns = ["um", "hmm", "ok"]
            .into_iter()
            .flat_map(|t| [Turn::user(t), Turn::assistant("Can you tell me what happened?")])
            .collect();
        let PolicyDecision::Complete(completion) = policy.decide(&snapshot(turns)) else {
            panic!("expected completion");
        };
        assert!(completion.classification.needs_human_callback());
        assert!(completion.facts.has_situation());
    }
}
