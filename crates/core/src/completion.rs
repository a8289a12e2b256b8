//! Completion marker contract
//!
//! A dialogue provider ends an interview by emitting its closing words, then
//! [`COMPLETION_MARKER`] on its own line, then one JSON object shaped like
//! [`CompletionPayload`].

use serde::Serialize;

use crate::classification::Classification;
use crate::facts::FactRecord;
use crate::severity::Severity;

/// Sentinel separating conversational text from the structured payload
pub const COMPLETION_MARKER: &str = "[TRIAGE_COMPLETE]";

/// The JSON object following the marker. Unknown values serialize as null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionPayload {
    pub patient_name: Option<String>,
    pub age: Option<u8>,
    pub is_conscious: Option<bool>,
    pub is_breathing: Option<bool>,
    pub has_heavy_bleeding: Option<bool>,
    pub is_trapped: Option<bool>,
    pub location: Option<String>,
    pub situation_description: Option<String>,
    pub disaster_type: Option<String>,
    pub num_victims: Option<u32>,
    pub environmental_dangers: Option<String>,
    pub severity: Severity,
    pub confidence: f32,
    pub detected_risk_factors: Vec<String>,
    pub reasoning: String,
    pub estimated_response_priority: u8,
    pub needs_human_callback: bool,
}

impl CompletionPayload {
    pub fn new(facts: &FactRecord, classification: &Classification) -> Self {
        Self {
            patient_name: facts.patient_name.clone(),
            age: facts.age,
            is_conscious: facts.is_conscious,
            is_breathing: facts.is_breathing,
            has_heavy_bleeding: facts.has_heavy_bleeding,
            is_trapped: facts.is_trapped,
            location: facts.location.clone(),
            situation_description: facts.situation_description.clone(),
            disaster_type: facts.disaster_type.clone(),
            num_victims: facts.num_victims,
            environmental_dangers: facts.environmental_dangers.clone(),
            severity: classification.severity(),
            confidence: classification.confidence(),
            detected_risk_factors: classification.risk_factors().map(str::to_string).collect(),
            reasoning: classification.reasoning().to_string(),
            estimated_response_priority: classification.priority(),
            needs_human_callback: classification.needs_human_callback(),
        }
    }

    /// Render `closing`, the marker line and the JSON payload as one reply
    pub fn render_reply(&self, closing: &str) -> crate::Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n\n{}\n{}", closing.trim(), COMPLETION_MARKER, json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_has_exact_keys() {
        let facts = FactRecord {
            is_breathing: Some(false),
            ..Default::default()
        };
        let classification = Classification::new(Severity::Critical, 0.8, ["NOT BREATHING"], "r", 1);
        let value = serde_json::to_value(CompletionPayload::new(&facts, &classification)).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 17);
        assert!(object["patient_name"].is_null());
        assert_eq!(object["is_breathing"], false);
        assert_eq!(object["needs_human_callback"], true);
        assert!(!object.contains_key("gender"));
    }

    #[test]
    fn test_render_reply_places_marker_on_own_line() {
        let payload = CompletionPayload::new(&FactRecord::default(), &Classification::conservative_default());
        let reply = payload.render_reply("Thank you.").unwrap();
        let mut lines = reply.lines();
        assert_eq!(lines.next(), Some("Thank you."));
        assert_eq!(lines.next(), Some(""));
        assert_eq!(lines.next(), Some(COMPLETION_MARKER));
        assert!(lines.next().unwrap().starts_with('{'));
    }
}
