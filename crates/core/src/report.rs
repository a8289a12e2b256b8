//! Finalized triage report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classification::Classification;
use crate::facts::{FactRecord, VitalSigns};

/// Channel a case arrived through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    /// Free-form chat dialogue
    Chat,
    /// Spoken dialogue transcribed turn by turn
    VoiceCall,
    /// Fixed-form phone interview
    PhoneCall,
    /// Single-shot text intake
    Text,
}

impl InputSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputSource::Chat => "chat",
            InputSource::VoiceCall => "voice_call",
            InputSource::PhoneCall => "phone_call",
            InputSource::Text => "text",
        }
    }
}

/// Everything responders need about one case.
///
/// The report carries no persistent identifier; the report store assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageReport {
    pub input_source: InputSource,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub facts: FactRecord,
    #[serde(flatten)]
    pub classification: Classification,
    pub vital_signs_reported: VitalSigns,
    pub conversation_transcript: String,
    pub caller_phone: Option<String>,
    /// Name of the provider that produced the final turn or classification
    pub ai_model: String,
}

impl TriageReport {
    /// Assemble a report, deriving vital signs from the facts
    pub fn new(
        input_source: InputSource,
        facts: FactRecord,
        classification: Classification,
        conversation_transcript: impl Into<String>,
        ai_model: impl Into<String>,
    ) -> Self {
        Self {
            input_source,
            timestamp: Utc::now(),
            vital_signs_reported: facts.vital_signs(),
            facts,
            classification,
            conversation_transcript: conversation_transcript.into(),
            caller_phone: None,
            ai_model: ai_model.into(),
        }
    }

    pub fn with_caller_phone(mut self, phone: Option<String>) -> Self {
        self.caller_phone = phone;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::VitalSign;
    use crate::severity::Severity;

    #[test]
    fn test_report_serializes_flat() {
        let facts = FactRecord {
            is_conscious: Some(false),
            situation_description: Some("collapsed at market".to_string()),
            ..Default::default()
        };
        let classification = Classification::new(Severity::Critical, 0.75, ["UNCONSCIOUS"], "r", 1);
        let report = TriageReport::new(InputSource::Chat, facts, classification, "Caller: help", "local");
        assert_eq!(report.vital_signs_reported.conscious, VitalSign::No);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["severity"], "CRITICAL");
        assert_eq!(json["is_conscious"], false);
        assert_eq!(json["needs_human_callback"], true);
        assert_eq!(json["input_source"], "chat");
        assert_eq!(json["vital_signs_reported"]["breathing"], "unknown");
    }
}
