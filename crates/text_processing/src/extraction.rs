//! Regex heuristic fact extraction
//!
//! Fallback used when no extraction backend answered. Works over the caller's
//! messages only, oldest first, so a later correction ("actually he is
//! breathing now") overrides an earlier statement.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use triage_core::{FactRecord, MAX_AGE};

use crate::answers::parse_number;
use crate::keywords::{DANGER_TYPES, DISASTER_TYPES};
use crate::phrases::PolarPhrases;

/// Situation summaries are capped at this many characters
pub const MAX_SITUATION_CHARS: usize = 300;

static CONSCIOUS: Lazy<PolarPhrases> = Lazy::new(|| {
    PolarPhrases::new(
        &[
            "unconscious",
            "unresponsive",
            "not conscious",
            "not responsive",
            "not responding",
            "passed out",
            "fainted",
        ],
        &[
            "conscious",
            "responsive",
            "talking",
            "awake",
            "alert",
            "responding",
            "can hear",
        ],
    )
});

static BREATHING: Lazy<PolarPhrases> = Lazy::new(|| {
    PolarPhrases::new(
        &[
            "not breathing",
            "stopped breathing",
            "no breathing",
            "can't breathe",
            "cant breathe",
            "cannot breathe",
        ],
        &["breathing", "can breathe"],
    )
});

static BLEEDING: Lazy<PolarPhrases> = Lazy::new(|| {
    PolarPhrases::new(
        &["no bleeding", "not bleeding", "no blood"],
        &[
            "heavy bleeding",
            "bleeding heavily",
            "lot of blood",
            "massive bleeding",
            "blood everywhere",
            "deep cut",
        ],
    )
});

static TRAPPED: Lazy<PolarPhrases> = Lazy::new(|| {
    PolarPhrases::new(
        &[
            "not trapped",
            "isn't trapped",
            "not stuck",
            "can walk",
            "can move",
            "free to move",
        ],
        &["trapped", "stuck", "pinned", "can't move", "under debris", "buried"],
    )
});

static NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:name is|named|called|name's)\s+([a-z][a-z'-]*(?:\s+[a-z][a-z'-]*){0,2})")
        .unwrap()
});

static AGE_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)\b(\d{1,3})\s*(?:-\s*)?(?:years?|yrs?)(?:\s*-\s*|\s+)old\b").unwrap(),
        Regex::new(r"(?i)\b(?:age|aged|age is)\s*:?\s*(\d{1,3})\b").unwrap(),
        Regex::new(r"(?i)\b(\d{1,3})\s*y/?o\b").unwrap(),
    ]
});

static LOCATION_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(
            r"(?i)\b(?:we are at|we're at|i am at|i'm at|located at|address is|location is|we are in|we're in|i am in|i'm in)\s+([^.,!?\n]{3,80})",
        )
        .unwrap(),
        Regex::new(
            r"(?i)\b(?:near|at|in|on)\s+(?:the\s+)?([a-z0-9][^.,!?\n]{0,60}?\b(?:street|st|road|rd|avenue|ave|building|hospital|school|mosque|market|camp|square|district|village|bridge))\b",
        )
        .unwrap(),
        Regex::new(r"(?i)\b((?:zone|block|sector|camp)\s+[a-z0-9]+)\b").unwrap(),
    ]
});

static VICTIMS_COUNTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b([a-z0-9]+(?:-[a-z]+)?)\s+(?:people|persons?|victims?|injured|casualties|of us|children|kids)\b",
    )
    .unwrap()
});

static FAMILY_OF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bfamily of\s+([a-z0-9]+)\b").unwrap());

/// Words that end a captured name
const NAME_STOPWORDS: &[&str] = &[
    "and", "but", "he", "she", "they", "we", "i", "is", "was", "who", "has", "age", "aged",
    "years", "at", "in", "from", "for", "to", "the", "a", "an", "my", "our", "help",
];

/// Captures that look like a location but describe a person or a state
const LOCATION_REJECT: &[&str] = &[
    "my mother", "my father", "my son", "my daughter", "my wife", "my husband", "my brother",
    "my sister", "my family", "my child", "my baby", "pain", "shock", "danger", "trouble", "a lot",
];

const INDOOR: &[&str] = &["inside", "indoors", "in the house", "in the building", "in our home"];
const OUTDOOR: &[&str] = &["outside", "outdoors", "in the street", "on the road", "in the open"];
const MALE: &[&str] = &["he", "his", "him", "man", "boy", "father", "husband", "son", "brother"];
const FEMALE: &[&str] = &["she", "her", "woman", "girl", "mother", "wife", "daughter", "sister"];

/// Regex heuristic extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicExtractor;

impl HeuristicExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Build a fact record from the caller's messages, oldest first
    pub fn extract<S: AsRef<str>>(&self, user_texts: &[S]) -> FactRecord {
        let messages: Vec<&str> = user_texts
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|m| !m.is_empty())
            .collect();
        if messages.is_empty() {
            return FactRecord::default();
        }

        let mut facts = FactRecord::default();
        for message in &messages {
            let update = FactRecord {
                is_conscious: CONSCIOUS.resolve(message),
                is_breathing: BREATHING.resolve(message),
                has_heavy_bleeding: BLEEDING.resolve(message),
                is_trapped: TRAPPED.resolve(message),
                patient_name: extract_name(message),
                age: extract_age(message),
                location: extract_location(message),
                num_victims: extract_victims(message),
                ..Default::default()
            };
            facts.merge(&update);
        }

        let joined = messages.join(" ").to_lowercase();
        facts.disaster_type = DISASTER_TYPES
            .iter()
            .find(|(_, phrases)| phrases.iter().any(|p| joined.contains(p)))
            .map(|(label, _)| label.to_string());

        let dangers: Vec<&str> = DANGER_TYPES
            .iter()
            .filter(|(_, phrases)| phrases.iter().any(|p| joined.contains(p)))
            .map(|(label, _)| *label)
            .collect();
        if !dangers.is_empty() {
            facts.environmental_dangers = Some(dangers.join(", "));
        }

        facts.indoor_outdoor = if contains_any(&joined, INDOOR) {
            Some("indoor".to_string())
        } else if contains_any(&joined, OUTDOOR) {
            Some("outdoor".to_string())
        } else {
            None
        };
        facts.gender = infer_gender(&joined);
        facts.situation_description = Some(summarize_situation(&messages));

        facts
    }
}

/// Join substantive messages with " | ", else use the first one
pub fn summarize_situation(messages: &[&str]) -> String {
    let substantive: Vec<&str> = messages
        .iter()
        .copied()
        .filter(|m| m.unicode_words().count() > 3)
        .collect();
    let summary = if substantive.is_empty() {
        messages.first().copied().unwrap_or_default().to_string()
    } else {
        substantive.join(" | ")
    };
    truncate_chars(&summary, MAX_SITUATION_CHARS)
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

fn contains_any(text_lower: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text_lower.contains(p))
}

fn extract_name(message: &str) -> Option<String> {
    let caps = NAME.captures(message)?;
    let words: Vec<String> = caps[1]
        .split_whitespace()
        .take_while(|w| !NAME_STOPWORDS.contains(&w.to_lowercase().as_str()))
        .map(title_case)
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn extract_age(message: &str) -> Option<u8> {
    AGE_PATTERNS
        .iter()
        .find_map(|re| re.captures(message))
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .filter(|age| (1..=MAX_AGE).contains(age))
        .map(|age| age as u8)
}

fn extract_location(message: &str) -> Option<String> {
    LOCATION_PATTERNS.iter().find_map(|re| {
        let caps = re.captures(message)?;
        let raw = caps[1].trim();
        let cut = [" and ", " with ", " but ", " where "]
            .iter()
            .filter_map(|sep| raw.to_ascii_lowercase().find(sep))
            .min()
            .unwrap_or(raw.len());
        let candidate = raw[..cut].trim();
        let lower = candidate.to_lowercase();
        if candidate.chars().count() < 3 || LOCATION_REJECT.iter().any(|r| lower.starts_with(r)) {
            None
        } else {
            Some(candidate.to_string())
        }
    })
}

fn extract_victims(message: &str) -> Option<u32> {
    VICTIMS_COUNTED
        .captures_iter(message)
        .chain(FAMILY_OF.captures_iter(message))
        .find_map(|caps| parse_number(&caps[1]))
}

fn infer_gender(text_lower: &str) -> Option<String> {
    let words: Vec<&str> = text_lower.unicode_words().collect();
    let male = words.iter().any(|w| MALE.contains(w));
    let female = words.iter().any(|w| FEMALE.contains(w));
    match (male, female) {
        (true, false) => Some("male".to_string()),
        (false, true) => Some("female".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(messages: &[&str]) -> FactRecord {
        HeuristicExtractor.extract(messages)
    }

    #[test]
    fn test_negated_consciousness() {
        let facts = extract(&["the patient is not conscious"]);
        assert_eq!(facts.is_conscious, Some(false));
        let facts = extract(&["he is unconscious but breathing"]);
        assert_eq!(facts.is_conscious, Some(false));
        assert_eq!(facts.is_breathing, Some(true));
    }

    #[test]
    fn test_later_statement_wins() {
        let facts = extract(&["she stopped breathing", "okay she is breathing again now"]);
        assert_eq!(facts.is_breathing, Some(true));
    }

    #[test]
    fn test_unmentioned_stays_unknown() {
        let facts = extract(&["there was an earthquake"]);
        assert_eq!(facts.is_breathing, None);
        assert_eq!(facts.is_conscious, None);
        assert_eq!(facts.is_trapped, None);
        assert_eq!(facts.disaster_type.as_deref(), Some("earthquake"));
    }

    #[test]
    fn test_name_age_location() {
        let facts = extract(&[
            "His name is ahmed hassan and he is 45 years old",
            "We are at 12 Main Street, near the market",
        ]);
        assert_eq!(facts.patient_name.as_deref(), Some("Ahmed Hassan"));
        assert_eq!(facts.age, Some(45));
        assert_eq!(facts.location.as_deref(), Some("12 Main Street"));
        assert_eq!(facts.gender.as_deref(), Some("male"));
    }

    #[test]
    fn test_location_rejects_family_words() {
        let facts = extract(&["I'm in pain"]);
        assert_eq!(facts.location, None);
        let facts = extract(&["we are in block 7"]);
        assert_eq!(facts.location.as_deref(), Some("block 7"));
    }

    #[test]
    fn test_victims() {
        assert_eq!(extract(&["5 people are hurt"]).num_victims, Some(5));
        assert_eq!(extract(&["three people are injured"]).num_victims, Some(3));
        assert_eq!(extract(&["a family of four"]).num_victims, Some(4));
        assert_eq!(extract(&["many people are hurt"]).num_victims, None);
    }

    #[test]
    fn test_trapped_negation() {
        assert_eq!(extract(&["he is not trapped"]).is_trapped, Some(false));
        assert_eq!(extract(&["she is stuck under debris"]).is_trapped, Some(true));
    }

    #[test]
    fn test_dangers_and_disaster() {
        let facts = extract(&["the building collapsed after the explosion and I smell gas, there is smoke"]);
        assert_eq!(facts.disaster_type.as_deref(), Some("explosion"));
        let dangers = facts.environmental_dangers.unwrap();
        assert!(dangers.contains("gas leak"));
        assert!(dangers.contains("fire"));
    }

    #[test]
    fn test_situation_summary() {
        let facts = extract(&["help", "my father fell from the roof", "yes"]);
        assert_eq!(
            facts.situation_description.as_deref(),
            Some("my father fell from the roof")
        );
        let facts = extract(&["help"]);
        assert_eq!(facts.situation_description.as_deref(), Some("help"));
        let long = "word ".repeat(200);
        let facts = extract(&[long.as_str()]);
        assert_eq!(
            facts.situation_description.unwrap().chars().count(),
            MAX_SITUATION_CHARS
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(extract(&[]).is_empty());
    }
}
