//! Fixed question set for the structured interview
//!
//! Channel adapters render prompts straight from [`QUESTIONS`]; the order
//! is part of the contract.

use serde::{Deserialize, Serialize};

/// Declared answer type of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerKind {
    Bool,
    Number,
    Text,
}

/// Question identifier, also the key answers are stored under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionId {
    Conscious,
    Breathing,
    Bleeding,
    Name,
    Age,
    Location,
    Trapped,
    Situation,
    Disaster,
    Victims,
    Dangers,
}

impl QuestionId {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionId::Conscious => "conscious",
            QuestionId::Breathing => "breathing",
            QuestionId::Bleeding => "bleeding",
            QuestionId::Name => "name",
            QuestionId::Age => "age",
            QuestionId::Location => "location",
            QuestionId::Trapped => "trapped",
            QuestionId::Situation => "situation",
            QuestionId::Disaster => "disaster",
            QuestionId::Victims => "victims",
            QuestionId::Dangers => "dangers",
        }
    }
}

/// One interview question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: &'static str,
    pub kind: AnswerKind,
}

/// Number of questions in the interview
pub const QUESTION_COUNT: usize = 11;

/// The interview, in order
pub static QUESTIONS: [Question; QUESTION_COUNT] = [
    Question {
        id: QuestionId::Conscious,
        prompt: "Is the person conscious? Please answer yes or no.",
        kind: AnswerKind::Bool,
    },
    Question {
        id: QuestionId::Breathing,
        prompt: "Is the person breathing? Please answer yes or no.",
        kind: AnswerKind::Bool,
    },
    Question {
        id: QuestionId::Bleeding,
        prompt: "Is there heavy bleeding? Please answer yes or no.",
        kind: AnswerKind::Bool,
    },
    Question {
        id: QuestionId::Name,
        prompt: "What is the patient's full name?",
        kind: AnswerKind::Text,
    },
    Question {
        id: QuestionId::Age,
        prompt: "How old is the patient?",
        kind: AnswerKind::Number,
    },
    Question {
        id: QuestionId::Location,
        prompt: "What is your exact location or address?",
        kind: AnswerKind::Text,
    },
    Question {
        id: QuestionId::Trapped,
        prompt: "Is the person trapped? Yes or no.",
        kind: AnswerKind::Bool,
    },
    Question {
        id: QuestionId::Situation,
        prompt: "Please describe what happened.",
        kind: AnswerKind::Text,
    },
    Question {
        id: QuestionId::Disaster,
        prompt: "What type of disaster is this? For example, earthquake, flood, fire, or explosion.",
        kind: AnswerKind::Text,
    },
    Question {
        id: QuestionId::Victims,
        prompt: "How many people are injured?",
        kind: AnswerKind::Number,
    },
    Question {
        id: QuestionId::Dangers,
        prompt: "Are there any environmental dangers nearby, such as fire, rising water, or risk of collapse? Please describe or say none.",
        kind: AnswerKind::Text,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_question_ids_unique() {
        let ids: HashSet<_> = QUESTIONS.iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), QUESTION_COUNT);
    }

    #[test]
    fn test_first_question_is_consciousness() {
        assert_eq!(QUESTIONS[0].id, QuestionId::Conscious);
        assert_eq!(QUESTIONS[0].kind, AnswerKind::Bool);
        assert_eq!(QUESTIONS[1].id, QuestionId::Breathing);
    }
}
