//! Severity classification handed to responders
//!
//! `needs_human_callback` is not a field: every classification asks for a
//! human callback, and the serialized form always carries `true`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::severity::Severity;

/// Reasoning used when a structured payload cannot be decoded
pub const UNPARSED_REASONING: &str = "unable to parse response — manual review recommended";

/// Final severity/priority decision for a case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ClassificationWire", into = "ClassificationWire")]
pub struct Classification {
    severity: Severity,
    confidence: f32,
    detected_risk_factors: BTreeSet<String>,
    reasoning: String,
    estimated_response_priority: u8,
}

impl Classification {
    /// Build a classification, clamping confidence to [0, 1] and priority
    /// to [1, 10]. Blank risk factors are dropped and duplicates collapse.
    pub fn new<I, S>(
        severity: Severity,
        confidence: f32,
        risk_factors: I,
        reasoning: impl Into<String>,
        priority: i32,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            severity,
            confidence,
            detected_risk_factors: risk_factors
                .into_iter()
                .map(Into::into)
                .map(|f: String| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect(),
            reasoning: reasoning.into(),
            estimated_response_priority: priority.clamp(1, 10) as u8,
        }
    }

    /// Conservative fallback used when no usable classification exists
    pub fn conservative_default() -> Self {
        Self::new(
            Severity::Moderate,
            0.3,
            Vec::<String>::new(),
            UNPARSED_REASONING,
            5,
        )
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn risk_factors(&self) -> impl Iterator<Item = &str> {
        self.detected_risk_factors.iter().map(String::as_str)
    }

    pub fn has_risk_factor(&self, label: &str) -> bool {
        self.detected_risk_factors.contains(label)
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn priority(&self) -> u8 {
        self.estimated_response_priority
    }

    /// Always true
    pub fn needs_human_callback(&self) -> bool {
        true
    }

    /// Add a risk factor and lower the priority number by `urgency`
    pub fn escalate_priority(&mut self, risk_factor: impl Into<String>, urgency: u8) {
        let label = risk_factor.into();
        if !label.trim().is_empty() {
            self.detected_risk_factors.insert(label);
        }
        self.estimated_response_priority = self
            .estimated_response_priority
            .saturating_sub(urgency)
            .max(1);
    }

    pub fn append_reasoning(&mut self, note: &str) {
        if self.reasoning.is_empty() {
            self.reasoning = note.to_string();
        } else {
            self.reasoning.push(' ');
            self.reasoning.push_str(note);
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct ClassificationWire {
    severity: Severity,
    #[serde(default)]
    confidence: f32,
    #[serde(default)]
    detected_risk_factors: Vec<String>,
    #[serde(default)]
    reasoning: String,
    #[serde(default = "default_priority")]
    estimated_response_priority: i32,
    #[serde(default = "always_true")]
    needs_human_callback: bool,
}

fn default_priority() -> i32 {
    5
}

fn always_true() -> bool {
    true
}

impl From<ClassificationWire> for Classification {
    fn from(wire: ClassificationWire) -> Self {
        Classification::new(
            wire.severity,
            wire.confidence,
            wire.detected_risk_factors,
            wire.reasoning,
            wire.estimated_response_priority,
        )
    }
}

impl From<Classification> for ClassificationWire {
    fn from(c: Classification) -> Self {
        Self {
            severity: c.severity,
            confidence: c.confidence,
            detected_risk_factors: c.detected_risk_factors.into_iter().collect(),
            reasoning: c.reasoning,
            estimated_response_priority: i32::from(c.estimated_response_priority),
            needs_human_callback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping_and_dedup() {
        let c = Classification::new(
            Severity::High,
            1.7,
            ["TRAPPED", "TRAPPED", " ", "FRACTURE"],
            "test",
            0,
        );
        assert_eq!(c.confidence(), 1.0);
        assert_eq!(c.priority(), 1);
        assert_eq!(c.risk_factors().count(), 2);
    }

    #[test]
    fn test_default_classification() {
        let c = Classification::conservative_default();
        assert_eq!(c.severity(), Severity::Moderate);
        assert!((c.confidence() - 0.3).abs() < f32::EPSILON);
        assert_eq!(c.priority(), 5);
        assert_eq!(c.reasoning(), UNPARSED_REASONING);
        assert!(c.needs_human_callback());
    }

    #[test]
    fn test_serialized_callback_is_true() {
        let c = Classification::new(Severity::Low, 0.45, ["SORE"], "minor", 8);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["needs_human_callback"], serde_json::Value::Bool(true));
        assert_eq!(json["severity"], "LOW");
    }

    #[test]
    fn test_deserialize_ignores_false_callback() {
        let json = r#"{"severity":"HIGH","confidence":0.6,"detected_risk_factors":["FRACTURE"],
            "reasoning":"x","estimated_response_priority":3,"needs_human_callback":false}"#;
        let c: Classification = serde_json::from_str(json).unwrap();
        assert!(c.needs_human_callback());
        let back = serde_json::to_value(&c).unwrap();
        assert_eq!(back["needs_human_callback"], serde_json::Value::Bool(true));
    }

    #[test]
    fn test_escalate_priority_floors_at_one() {
        let mut c = Classification::new(Severity::Critical, 0.9, ["NOT BREATHING"], "", 1);
        c.escalate_priority("MULTIPLE VICTIMS (4)", 1);
        assert_eq!(c.priority(), 1);
        assert!(c.has_risk_factor("MULTIPLE VICTIMS (4)"));
    }
}
