//! Fact record: what is known about one case
//!
//! Boolean facts are tri-state. `None` means nobody has said, and is never
//! read as `false`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upper bound accepted for a patient age
pub const MAX_AGE: u32 = 150;

/// Structured snapshot of known case attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactRecord {
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub is_conscious: Option<bool>,
    #[serde(default)]
    pub is_breathing: Option<bool>,
    #[serde(default)]
    pub has_heavy_bleeding: Option<bool>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub is_trapped: Option<bool>,
    #[serde(default)]
    pub indoor_outdoor: Option<String>,
    #[serde(default)]
    pub situation_description: Option<String>,
    #[serde(default)]
    pub disaster_type: Option<String>,
    #[serde(default)]
    pub num_victims: Option<u32>,
    #[serde(default)]
    pub environmental_dangers: Option<String>,
}

impl FactRecord {
    /// Read a record out of loosely-typed JSON produced by a model.
    ///
    /// Accepts strings where numbers or booleans are expected ("45", "yes"),
    /// treats `"unknown"`/`"null"`/empty as absent, and drops ages outside
    /// 0..=150. Anything that cannot be read is left unknown.
    pub fn from_json_value(value: &Value) -> Self {
        let field = |key: &str| value.get(key).unwrap_or(&Value::Null);
        Self {
            patient_name: lenient_text(field("patient_name")),
            age: lenient_u32(field("age"))
                .filter(|age| *age <= MAX_AGE)
                .map(|age| age as u8),
            gender: lenient_text(field("gender")),
            is_conscious: lenient_bool(field("is_conscious")),
            is_breathing: lenient_bool(field("is_breathing")),
            has_heavy_bleeding: lenient_bool(field("has_heavy_bleeding")),
            location: lenient_text(field("location")),
            is_trapped: lenient_bool(field("is_trapped")),
            indoor_outdoor: lenient_text(field("indoor_outdoor")),
            situation_description: lenient_text(field("situation_description")),
            disaster_type: lenient_text(field("disaster_type")),
            num_victims: lenient_u32(field("num_victims")),
            environmental_dangers: lenient_text(field("environmental_dangers")),
        }
    }

    /// Overlay every known field of `other` onto `self`.
    ///
    /// Unknown values in `other` never erase what is already known.
    pub fn merge(&mut self, other: &FactRecord) {
        fn take<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
            if src.is_some() {
                dst.clone_from(src);
            }
        }
        take(&mut self.patient_name, &other.patient_name);
        take(&mut self.age, &other.age);
        take(&mut self.gender, &other.gender);
        take(&mut self.is_conscious, &other.is_conscious);
        take(&mut self.is_breathing, &other.is_breathing);
        take(&mut self.has_heavy_bleeding, &other.has_heavy_bleeding);
        take(&mut self.location, &other.location);
        take(&mut self.is_trapped, &other.is_trapped);
        take(&mut self.indoor_outdoor, &other.indoor_outdoor);
        take(&mut self.situation_description, &other.situation_description);
        take(&mut self.disaster_type, &other.disaster_type);
        take(&mut self.num_victims, &other.num_victims);
        take(&mut self.environmental_dangers, &other.environmental_dangers);
    }

    /// Fill only the fields still unknown in `self`
    pub fn fill_gaps(&mut self, other: &FactRecord) {
        let mut merged = other.clone();
        merged.merge(self);
        *self = merged;
    }

    /// True when no field is known
    pub fn is_empty(&self) -> bool {
        *self == FactRecord::default()
    }

    /// True when a non-blank situation description is present
    pub fn has_situation(&self) -> bool {
        self.situation_description
            .as_deref()
            .map_or(false, |s| !s.trim().is_empty())
    }

    /// Number of known fields
    pub fn known_count(&self) -> usize {
        [
            self.patient_name.is_some(),
            self.age.is_some(),
            self.gender.is_some(),
            self.is_conscious.is_some(),
            self.is_breathing.is_some(),
            self.has_heavy_bleeding.is_some(),
            self.location.is_some(),
            self.is_trapped.is_some(),
            self.indoor_outdoor.is_some(),
            self.situation_description.is_some(),
            self.disaster_type.is_some(),
            self.num_victims.is_some(),
            self.environmental_dangers.is_some(),
        ]
        .iter()
        .filter(|known| **known)
        .count()
    }

    /// Responder-facing summary of the vital signs
    pub fn vital_signs(&self) -> VitalSigns {
        fn yes_no(value: Option<bool>) -> VitalSign {
            match value {
                Some(true) => VitalSign::Yes,
                Some(false) => VitalSign::No,
                None => VitalSign::Unknown,
            }
        }
        VitalSigns {
            breathing: yes_no(self.is_breathing),
            conscious: yes_no(self.is_conscious),
            bleeding: match self.has_heavy_bleeding {
                Some(true) => VitalSign::Severe,
                Some(false) => VitalSign::None,
                None => VitalSign::Unknown,
            },
        }
    }
}

/// Reported state of a single vital sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VitalSign {
    Yes,
    No,
    Severe,
    None,
    Unknown,
}

/// Vital signs as reported by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitalSigns {
    pub breathing: VitalSign,
    pub conscious: VitalSign,
    pub bleeding: VitalSign,
}

fn lenient_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            let lowered = trimmed.to_ascii_lowercase();
            if trimmed.is_empty() || matches!(lowered.as_str(), "null" | "none" | "unknown" | "n/a") {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" => Some(true),
            "false" | "no" | "n" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn lenient_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_json_reading() {
        let value = json!({
            "patient_name": "Ahmed",
            "age": "45",
            "is_conscious": "no",
            "is_breathing": true,
            "has_heavy_bleeding": null,
            "location": "unknown",
            "num_victims": 3.0,
        });
        let facts = FactRecord::from_json_value(&value);
        assert_eq!(facts.patient_name.as_deref(), Some("Ahmed"));
        assert_eq!(facts.age, Some(45));
        assert_eq!(facts.is_conscious, Some(false));
        assert_eq!(facts.is_breathing, Some(true));
        assert_eq!(facts.has_heavy_bleeding, None);
        assert_eq!(facts.location, None);
        assert_eq!(facts.num_victims, Some(3));
    }

    #[test]
    fn test_age_out_of_range_is_unknown() {
        let facts = FactRecord::from_json_value(&json!({ "age": 212 }));
        assert_eq!(facts.age, None);
    }

    #[test]
    fn test_merge_never_erases_known_values() {
        let mut base = FactRecord {
            is_breathing: Some(false),
            location: Some("Block 3".to_string()),
            ..Default::default()
        };
        let update = FactRecord {
            is_conscious: Some(true),
            ..Default::default()
        };
        base.merge(&update);
        assert_eq!(base.is_breathing, Some(false));
        assert_eq!(base.is_conscious, Some(true));
        assert_eq!(base.location.as_deref(), Some("Block 3"));
    }

    #[test]
    fn test_fill_gaps_keeps_existing() {
        let mut base = FactRecord {
            age: Some(30),
            ..Default::default()
        };
        let other = FactRecord {
            age: Some(31),
            patient_name: Some("Sara".to_string()),
            ..Default::default()
        };
        base.fill_gaps(&other);
        assert_eq!(base.age, Some(30));
        assert_eq!(base.patient_name.as_deref(), Some("Sara"));
    }

    #[test]
    fn test_vital_signs_unknown_is_not_no() {
        let facts = FactRecord {
            has_heavy_bleeding: Some(true),
            ..Default::default()
        };
        let vitals = facts.vital_signs();
        assert_eq!(vitals.breathing, VitalSign::Unknown);
        assert_eq!(vitals.conscious, VitalSign::Unknown);
        assert_eq!(vitals.bleeding, VitalSign::Severe);
    }
}
