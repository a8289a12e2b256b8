//! Structured interview state machine
//!
//! Fixed 11-step question sequence for channels that cannot hold a free
//! conversation (IVR, SMS). Every answer advances exactly one step, whether
//! or not it could be parsed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use triage_core::{AnswerKind, FactRecord, Question, QuestionId, MAX_AGE, QUESTIONS, QUESTION_COUNT};
use triage_text_processing::{parse_bool, parse_number};

/// Situation used when the caller gave none
pub const NO_DESCRIPTION: &str = "No description provided";

/// Parsed answer, `None` when unreadable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Bool(Option<bool>),
    Number(Option<u32>),
    Text(Option<String>),
}

impl Answer {
    fn parse(kind: AnswerKind, raw: &str) -> Self {
        match kind {
            AnswerKind::Bool => Answer::Bool(parse_bool(raw)),
            AnswerKind::Number => Answer::Number(parse_number(raw)),
            AnswerKind::Text => {
                let trimmed = raw.trim();
                Answer::Text((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            Answer::Bool(b) => *b,
            _ => None,
        }
    }

    fn as_number(&self) -> Option<u32> {
        match self {
            Answer::Number(n) => *n,
            _ => None,
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(t) => t.as_deref(),
            _ => None,
        }
    }
}

/// Result of answering one question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewStep {
    Next(&'static Question),
    Complete,
}

/// Fixed-form interview session
#[derive(Debug, Clone)]
pub struct StructuredInterview {
    pub id: String,
    pub caller: Option<String>,
    step: usize,
    answers: BTreeMap<QuestionId, Answer>,
    transcript: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl StructuredInterview {
    pub fn new(id: impl Into<String>, caller: Option<String>) -> Self {
        Self {
            id: id.into(),
            caller,
            step: 0,
            answers: BTreeMap::new(),
            transcript: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn is_complete(&self) -> bool {
        self.step >= QUESTION_COUNT
    }

    pub fn current_question(&self) -> Option<&'static Question> {
        QUESTIONS.get(self.step)
    }

    pub fn answer_for(&self, id: QuestionId) -> Option<&Answer> {
        self.answers.get(&id)
    }

    /// Record the answer to the current question and advance.
    ///
    /// Answering a completed interview changes nothing.
    pub fn answer(&mut self, raw: &str) -> InterviewStep {
        let Some(question) = self.current_question() else {
            return InterviewStep::Complete;
        };

        self.transcript.push(format!("AI: {}", question.prompt));
        self.transcript.push(format!("Caller: {}", raw.trim()));
        self.answers.insert(question.id, Answer::parse(question.kind, raw));
        self.step += 1;

        tracing::debug!(
            session_id = %self.id,
            question = question.id.as_str(),
            step = self.step,
            "Interview answer recorded"
        );

        match self.current_question() {
            Some(next) => InterviewStep::Next(next),
            None => InterviewStep::Complete,
        }
    }

    /// "AI: …" / "Caller: …" lines
    pub fn transcript(&self) -> String {
        self.transcript.join("\n")
    }

    /// Map the answers onto a fact record
    pub fn to_fact_record(&self) -> FactRecord {
        let get = |id| self.answers.get(&id);
        let text = |id| get(id).and_then(Answer::as_text).map(str::to_string);

        FactRecord {
            is_conscious: get(QuestionId::Conscious).and_then(Answer::as_bool),
            is_breathing: get(QuestionId::Breathing).and_then(Answer::as_bool),
            has_heavy_bleeding: get(QuestionId::Bleeding).and_then(Answer::as_bool),
            patient_name: text(QuestionId::Name),
            age: get(QuestionId::Age)
                .and_then(Answer::as_number)
                .filter(|age| *age <= MAX_AGE)
                .map(|age| age as u8),
            location: text(QuestionId::Location),
            is_trapped: get(QuestionId::Trapped).and_then(Answer::as_bool),
            situation_description: Some(
                text(QuestionId::Situation).unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            ),
            disaster_type: text(QuestionId::Disaster),
            num_victims: get(QuestionId::Victims).and_then(Answer::as_number),
            environmental_dangers: text(QuestionId::Dangers).filter(|d| {
                !matches!(d.to_lowercase().trim(), "none" | "no" | "nothing")
            }),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_to_first_question() {
        let mut interview = StructuredInterview::new("i1", None);
        let step = interview.answer("no");
        assert_eq!(step, InterviewStep::Next(&QUESTIONS[1]));
        assert_eq!(interview.step(), 1);
        assert_eq!(interview.to_fact_record().is_conscious, Some(false));
    }

    #[test]
    fn test_completes_in_eleven_answers() {
        let mut interview = StructuredInterview::new("i1", Some("+15550100".to_string()));
        for i in 0..QUESTION_COUNT {
            assert!(!interview.is_complete());
            let step = interview.answer("whatever");
            if i + 1 < QUESTION_COUNT {
                assert!(matches!(step, InterviewStep::Next(_)));
            } else {
                assert_eq!(step, InterviewStep::Complete);
            }
        }
        assert!(interview.is_complete());
        assert_eq!(interview.current_question(), None);

        // Further answers are a no-op
        assert_eq!(interview.answer("yes"), InterviewStep::Complete);
        assert_eq!(interview.step(), QUESTION_COUNT);
        assert_eq!(interview.transcript().lines().count(), QUESTION_COUNT * 2);
    }

    #[test]
    fn test_unparsable_answers_are_unknown() {
        let mut interview = StructuredInterview::new("i1", None);
        interview.answer("I don't know");
        assert_eq!(interview.answer_for(QuestionId::Conscious), Some(&Answer::Bool(None)));
        assert_eq!(interview.to_fact_record().is_conscious, None);
    }

    #[test]
    fn test_fact_record_mapping() {
        let mut interview = StructuredInterview::new("i1", None);
        for raw in [
            "yes",
            "the patient is not breathing",
            "no",
            "Ahmed Hassan",
            "two hundred",
            "Block 4, Al Nasr street",
            "yes",
            "",
            "earthquake",
            "three",
            "none",
        ] {
            interview.answer(raw);
        }
        let facts = interview.to_fact_record();
        assert_eq!(facts.is_conscious, Some(true));
        assert_eq!(facts.is_breathing, Some(false));
        assert_eq!(facts.has_heavy_bleeding, Some(false));
        assert_eq!(facts.patient_name.as_deref(), Some("Ahmed Hassan"));
        assert_eq!(facts.age, None);
        assert_eq!(facts.location.as_deref(), Some("Block 4, Al Nasr street"));
        assert_eq!(facts.is_trapped, Some(true));
        assert_eq!(facts.situation_description.as_deref(), Some(NO_DESCRIPTION));
        assert_eq!(facts.disaster_type.as_deref(), Some("earthquake"));
        assert_eq!(facts.num_victims, Some(3));
        assert_eq!(facts.environmental_dangers, None);
    }
}
