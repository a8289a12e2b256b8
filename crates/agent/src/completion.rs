//! Completion marker parsing
//!
//! A finished reply looks like:
//!
//! ```text
//! Thank you, help is being arranged.
//!
//! [TRIAGE_COMPLETE]
//! {"patient_name": null, "is_breathing": false, "severity": "CRITICAL", ...}
//! ```
//!
//! Models do not always follow the contract, so the payload is read leniently
//! and a payload that cannot be read at all still yields a usable result.

use serde_json::Value;

use triage_core::{Classification, FactRecord, Severity, COMPLETION_MARKER};
use triage_llm::strip_code_fences;

/// Why a payload could not be decoded
#[derive(Debug, Clone, PartialEq)]
pub enum ParseFailure {
    EmptyPayload,
    InvalidJson(String),
    NotAnObject,
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseFailure::EmptyPayload => write!(f, "empty payload"),
            ParseFailure::InvalidJson(e) => write!(f, "invalid JSON: {}", e),
            ParseFailure::NotAnObject => write!(f, "payload is not a JSON object"),
        }
    }
}

/// Decoded completion
#[derive(Debug, Clone)]
pub struct Completion {
    /// Caller-facing text before the marker
    pub display_text: String,
    pub facts: FactRecord,
    /// Present only when the payload carried a valid severity
    pub classification: Option<Classification>,
    pub failure: Option<ParseFailure>,
}

pub struct CompletionParser;

impl CompletionParser {
    pub fn contains_marker(raw: &str) -> bool {
        raw.contains(COMPLETION_MARKER)
    }

    /// `None` when the marker is absent
    pub fn parse(raw: &str) -> Option<Completion> {
        let idx = raw.find(COMPLETION_MARKER)?;
        let display_text = raw[..idx].trim().to_string();
        let payload = strip_code_fences(&raw[idx + COMPLETION_MARKER.len()..]);

        let completion = match decode_object(payload) {
            Ok(value) => Completion {
                display_text,
                facts: FactRecord::from_json_value(&value),
                classification: classification_from_value(&value),
                failure: None,
            },
            Err(failure) => Completion {
                display_text,
                facts: FactRecord::default(),
                classification: Some(Classification::conservative_default()),
                failure: Some(failure),
            },
        };
        Some(completion)
    }
}

/// Decode a JSON object, retrying on the outermost `{…}` slice
pub fn decode_object(payload: &str) -> Result<Value, ParseFailure> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(ParseFailure::EmptyPayload);
    }

    let value = match serde_json::from_str::<Value>(payload) {
        Ok(value) => value,
        Err(first_err) => {
            let slice = match (payload.find('{'), payload.rfind('}')) {
                (Some(start), Some(end)) if start < end => &payload[start..=end],
                _ => return Err(ParseFailure::InvalidJson(first_err.to_string())),
            };
            serde_json::from_str::<Value>(slice)
                .map_err(|e| ParseFailure::InvalidJson(e.to_string()))?
        }
    };

    if value.is_object() {
        Ok(value)
    } else {
        Err(ParseFailure::NotAnObject)
    }
}

/// Read a classification out of loosely-typed JSON.
///
/// Requires a recognisable severity; everything else is repaired or
/// defaulted. Risk factors given as a single string are wrapped.
pub fn classification_from_value(value: &Value) -> Option<Classification> {
    let severity = value
        .get("severity")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Severity>().ok())?;

    let confidence = value.get("confidence").and_then(lenient_f64).unwrap_or(0.5) as f32;
    let priority = value
        .get("estimated_response_priority")
        .and_then(lenient_f64)
        .map(|p| p.round() as i32)
        .unwrap_or_else(|| i32::from(severity.base_priority()));

    let risk_factors: Vec<String> = match value.get("detected_risk_factors") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    };

    let reasoning = value
        .get("reasoning")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(Classification::new(
        severity,
        confidence,
        risk_factors,
        reasoning,
        priority,
    ))
}

fn lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
