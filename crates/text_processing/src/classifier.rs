//! Deterministic severity classifier
//!
//! Used whenever no remote model produced a classification, and as the only
//! classifier for the fixed-form phone interview. No state, no I/O.
//!
//! Precedence, highest wins:
//! direct-safety CRITICAL > critical keywords > direct-safety HIGH floor >
//! high keywords > moderate keywords > low keywords > default MODERATE.
//! Vulnerability and entrapment then bump one tier each, never past CRITICAL.

use triage_core::{Classification, FactRecord, Severity};

use crate::keywords::{
    CRITICAL_KEYWORDS, HIGH_KEYWORDS, KEYWORD_TABLE_VERSION, LOW_KEYWORDS, MODERATE_KEYWORDS,
    VULNERABILITY_KEYWORDS,
};
use crate::phrases::all_contained;

/// Safety facts that override free text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SafetyFacts {
    pub is_conscious: Option<bool>,
    pub is_breathing: Option<bool>,
    pub has_heavy_bleeding: Option<bool>,
    pub is_trapped: Option<bool>,
    pub age: Option<u8>,
}

impl From<&FactRecord> for SafetyFacts {
    fn from(facts: &FactRecord) -> Self {
        Self {
            is_conscious: facts.is_conscious,
            is_breathing: facts.is_breathing,
            has_heavy_bleeding: facts.has_heavy_bleeding,
            is_trapped: facts.is_trapped,
            age: facts.age,
        }
    }
}

/// Keyword hits per tier
#[derive(Debug, Default)]
struct TierHits<'a> {
    critical: Vec<&'a str>,
    high: Vec<&'a str>,
    moderate: Vec<&'a str>,
    low: Vec<&'a str>,
    vulnerable: Vec<&'a str>,
}

impl TierHits<'static> {
    fn scan(text: &str) -> Self {
        let lower = text.to_lowercase();
        Self {
            critical: all_contained(&lower, CRITICAL_KEYWORDS),
            high: all_contained(&lower, HIGH_KEYWORDS),
            moderate: all_contained(&lower, MODERATE_KEYWORDS),
            low: all_contained(&lower, LOW_KEYWORDS),
            vulnerable: all_contained(&lower, VULNERABILITY_KEYWORDS),
        }
    }
}

/// Severity classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct SeverityClassifier;

impl SeverityClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify free text plus direct safety facts
    pub fn classify(&self, situation_text: &str, facts: &SafetyFacts) -> Classification {
        let hits = TierHits::scan(situation_text);
        let mut risk_factors: Vec<String> = Vec::new();

        let breathing_stopped = facts.is_breathing == Some(false);
        let unconscious = facts.is_conscious == Some(false);
        let heavy_bleeding = facts.has_heavy_bleeding == Some(true);
        let trapped = facts.is_trapped == Some(true);

        if breathing_stopped {
            risk_factors.push("NOT BREATHING".to_string());
        }
        if unconscious {
            risk_factors.push("UNCONSCIOUS".to_string());
        }
        if heavy_bleeding {
            risk_factors.push("HEAVY BLEEDING".to_string());
        }
        if trapped {
            risk_factors.push("TRAPPED".to_string());
        }
        risk_factors.extend(hits.critical.iter().map(|k| k.to_uppercase()));
        risk_factors.extend(hits.high.iter().map(|k| k.to_uppercase()));

        // Tier decision without entrapment, so we can tell whether the
        // trapped floor is what lifted the case to HIGH.
        let (mut severity, mut confidence, mut priority) = if breathing_stopped
            || unconscious
            || !hits.critical.is_empty()
        {
            (
                Severity::Critical,
                scaled_confidence(0.70, hits.critical.len(), 0.95),
                1,
            )
        } else if heavy_bleeding || !hits.high.is_empty() {
            (Severity::High, scaled_confidence(0.55, hits.high.len(), 0.80), 3)
        } else if !hits.moderate.is_empty() {
            (
                Severity::Moderate,
                scaled_confidence(0.45, hits.moderate.len(), 0.70),
                5,
            )
        } else if !hits.low.is_empty() {
            (Severity::Low, 0.45, 8)
        } else {
            (Severity::Moderate, 0.35, 5)
        };

        let trapped_floor_applied = trapped && severity < Severity::High;
        if trapped_floor_applied {
            severity = Severity::High;
            confidence = confidence.max(0.55);
            priority = 3;
        }

        // Vulnerability: every trigger together yields a single bump
        let mut vulnerable = false;
        if let Some(age) = facts.age {
            if age < 12 {
                risk_factors.push(format!("CHILD (age {})", age));
                vulnerable = true;
            } else if age > 65 {
                risk_factors.push(format!("ELDERLY (age {})", age));
                vulnerable = true;
            }
        }
        if !hits.vulnerable.is_empty() {
            risk_factors.push(format!("VULNERABLE: {}", hits.vulnerable.join(", ")));
            vulnerable = true;
        }
        if vulnerable {
            bump(&mut severity, &mut priority);
        }

        if trapped && !trapped_floor_applied {
            bump(&mut severity, &mut priority);
        }

        let reasoning = format!(
            "Keyword classification (tables v{}): {} critical, {} high, {} moderate, {} low indicators. \
             Safety: conscious={}, breathing={}, heavy_bleeding={}, trapped={}, age={}.",
            KEYWORD_TABLE_VERSION,
            hits.critical.len(),
            hits.high.len(),
            hits.moderate.len(),
            hits.low.len(),
            tri_state(facts.is_conscious),
            tri_state(facts.is_breathing),
            tri_state(facts.has_heavy_bleeding),
            tri_state(facts.is_trapped),
            facts.age.map_or_else(|| "unknown".to_string(), |a| a.to_string()),
        );

        Classification::new(severity, confidence, risk_factors, reasoning, priority)
    }

    /// Classify a whole case: text and safety facts, then scene adjustments
    /// for environmental hazards and multiple victims.
    pub fn classify_case(&self, facts: &FactRecord) -> Classification {
        let text = case_text(facts);
        let mut classification = self.classify(&text, &SafetyFacts::from(facts));

        if let Some(dangers) = facts.environmental_dangers.as_deref() {
            if !is_none_answer(dangers) {
                classification.escalate_priority("ENVIRONMENTAL HAZARDS", 1);
                classification.append_reasoning(&format!("Scene hazards: {}.", dangers));
            }
        }
        if let Some(victims) = facts.num_victims.filter(|n| *n > 1) {
            classification.escalate_priority(format!("MULTIPLE VICTIMS ({})", victims), 1);
        }

        classification
    }
}

/// Free text a case is classified on
fn case_text(facts: &FactRecord) -> String {
    [
        facts.situation_description.as_deref(),
        facts.disaster_type.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(". ")
}

fn is_none_answer(text: &str) -> bool {
    matches!(
        text.trim().to_lowercase().as_str(),
        "" | "none" | "no" | "nothing" | "n/a" | "no dangers"
    )
}

fn scaled_confidence(base: f32, hits: usize, cap: f32) -> f32 {
    (base + 0.05 * hits as f32).min(cap)
}

fn bump(severity: &mut Severity, priority: &mut i32) {
    if *severity != Severity::Critical {
        *severity = severity.bumped();
        *priority = (*priority - 1).max(1);
    }
}

fn tri_state(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "true",
        Some(false) => "false",
        None => "unknown",
    }
}
