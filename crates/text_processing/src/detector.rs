//! Critical keyword detector
//!
//! Runs on every inbound utterance before any remote call, so it must stay
//! allocation-light and free of I/O. Patterns are compiled once at startup.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use triage_core::Severity;

use crate::keywords::{DETECTOR_CRITICAL, DETECTOR_ENVIRONMENTAL, DETECTOR_HIGH, KeywordGroup};

static MULTI_VICTIM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:people|persons?|victims?|injured|dead|casualties)").unwrap()
});

static AGE_MENTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d{1,3})\s*(?:years?\s*old|y/?o|months?\s*old)").unwrap()
});

/// Immediate escalation raised by a single utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationSignal {
    /// Severity floor implied by the utterance
    pub severity: Severity,
    /// Response priority, 1 = most urgent
    pub priority: u8,
    /// De-duplicated labels in detection order
    pub risk_factors: Vec<String>,
    /// True when a CRITICAL-tier phrase fired
    pub is_critical: bool,
}

/// Critical keyword detector
#[derive(Debug, Clone, Copy, Default)]
pub struct CriticalKeywordDetector;

impl CriticalKeywordDetector {
    pub fn new() -> Self {
        Self
    }

    /// Scan one utterance. `None` means nothing alarming was said, which is
    /// not evidence that the patient is safe.
    pub fn detect(&self, utterance: &str) -> Option<EscalationSignal> {
        let lower = utterance.to_lowercase();
        let mut risk_factors: Vec<String> = Vec::new();
        let mut severity: Option<Severity> = None;
        let mut priority: i32 = 10;

        let critical = matching_labels(&lower, DETECTOR_CRITICAL);
        if !critical.is_empty() {
            severity = Some(Severity::Critical);
            priority = 1;
            push_unique(&mut risk_factors, critical);
        }

        let high = matching_labels(&lower, DETECTOR_HIGH);
        if !high.is_empty() {
            if severity != Some(Severity::Critical) {
                severity = Some(Severity::High);
            }
            priority = priority.min(3);
            push_unique(&mut risk_factors, high);
        }

        let environmental = matching_labels(&lower, DETECTOR_ENVIRONMENTAL);
        if !environmental.is_empty() {
            if severity.is_none() {
                severity = Some(Severity::High);
            }
            priority = priority.min(4);
            push_unique(&mut risk_factors, environmental);
        }

        if let Some(count) = MULTI_VICTIM
            .captures(&lower)
            .and_then(|c| c[1].parse::<u32>().ok())
        {
            if count > 1 {
                push_unique(&mut risk_factors, [format!("MULTIPLE VICTIMS ({})", count)]);
                priority -= 1;
            }
        }

        if let Some(age) = AGE_MENTION
            .captures(&lower)
            .and_then(|c| c[1].parse::<u32>().ok())
        {
            if age < 5 {
                push_unique(&mut risk_factors, [format!("INFANT/TODDLER (age {})", age)]);
                priority -= 1;
            } else if age < 12 {
                push_unique(&mut risk_factors, [format!("CHILD (age {})", age)]);
            } else if age > 75 {
                push_unique(&mut risk_factors, [format!("ELDERLY (age {})", age)]);
                priority -= 1;
            }
        }

        if risk_factors.is_empty() {
            return None;
        }

        let severity = severity.unwrap_or(Severity::Moderate);
        Some(EscalationSignal {
            severity,
            priority: priority.clamp(1, 10) as u8,
            risk_factors,
            is_critical: severity == Severity::Critical,
        })
    }
}

/// Convenience wrapper over [`CriticalKeywordDetector::detect`]
pub fn detect_critical(utterance: &str) -> Option<EscalationSignal> {
    CriticalKeywordDetector.detect(utterance)
}

fn matching_labels(text_lower: &str, groups: &[KeywordGroup]) -> Vec<String> {
    groups
        .iter()
        .filter(|(_, phrases)| phrases.iter().any(|p| text_lower.contains(p)))
        .map(|(label, _)| label.to_string())
        .collect()
}

fn push_unique(dst: &mut Vec<String>, labels: impl IntoIterator<Item = String>) {
    for label in labels {
        if !dst.contains(&label) {
            dst.push(label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_is_none() {
        assert!(detect_critical("hello, I need to report something").is_none());
        assert!(detect_critical("").is_none());
    }

    #[test]
    fn test_critical_wins_over_high() {
        let signal = detect_critical("he is trapped and not breathing").unwrap();
        assert_eq!(signal.severity, Severity::Critical);
        assert_eq!(signal.priority, 1);
        assert!(signal.is_critical);
        assert!(signal.risk_factors.contains(&"NOT BREATHING".to_string()));
        assert!(signal.risk_factors.contains(&"TRAPPED".to_string()));
    }

    #[test]
    fn test_high_tier() {
        let signal = detect_critical("I think his leg has a fracture").unwrap();
        assert_eq!(signal.severity, Severity::High);
        assert_eq!(signal.priority, 3);
        assert!(!signal.is_critical);
    }

    #[test]
    fn test_environmental_only_sets_floor_when_unset() {
        let signal = detect_critical("there is a gas leak in the building").unwrap();
        assert_eq!(signal.severity, Severity::High);
        assert_eq!(signal.priority, 4);

        // Environmental never lowers an existing CRITICAL
        let signal = detect_critical("she passed out and there is smoke").unwrap();
        assert_eq!(signal.severity, Severity::Critical);
        assert_eq!(signal.priority, 1);
    }

    #[test]
    fn test_multiple_victims_and_age() {
        let signal = detect_critical("5 people hurt, one is a 3 year old").unwrap();
        assert_eq!(signal.severity, Severity::Moderate);
        assert!(signal.risk_factors.contains(&"MULTIPLE VICTIMS (5)".to_string()));
        assert!(signal.risk_factors.contains(&"INFANT/TODDLER (age 3)".to_string()));
        assert_eq!(signal.priority, 8);
    }

    #[test]
    fn test_single_victim_is_not_multiple() {
        assert!(detect_critical("1 person here").is_none());
    }

    #[test]
    fn test_elderly() {
        let signal = detect_critical("my grandmother is 82 years old and has chest pain").unwrap();
        assert_eq!(signal.severity, Severity::High);
        assert!(signal.risk_factors.contains(&"ELDERLY (age 82)".to_string()));
        assert_eq!(signal.priority, 2);
    }

    #[test]
    fn test_labels_not_duplicated() {
        let signal = detect_critical("unconscious, unresponsive, not responding").unwrap();
        assert_eq!(
            signal.risk_factors.iter().filter(|f| *f == "UNCONSCIOUS").count(),
            1
        );
    }
}
