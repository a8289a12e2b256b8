//! Interview topics and coverage detection

use std::collections::BTreeSet;

use triage_core::{FactRecord, Turn, TurnRole};
use triage_text_processing::{parse_bool, HeuristicExtractor};
use unicode_segmentation::UnicodeSegmentation;

/// What the local policy tries to learn, declared in asking order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Topic {
    Situation,
    Breathing,
    Conscious,
    Location,
    Bleeding,
    Name,
    Age,
    Trapped,
    Disaster,
    Victims,
    Dangers,
}

/// Every topic, highest priority first
pub const TOPIC_PRIORITY: [Topic; 11] = [
    Topic::Situation,
    Topic::Breathing,
    Topic::Conscious,
    Topic::Location,
    Topic::Bleeding,
    Topic::Name,
    Topic::Age,
    Topic::Trapped,
    Topic::Disaster,
    Topic::Victims,
    Topic::Dangers,
];

impl Topic {
    /// Topics required before the interview may end early
    pub fn is_essential(&self) -> bool {
        matches!(
            self,
            Topic::Situation | Topic::Conscious | Topic::Breathing | Topic::Location
        )
    }

    /// Facts about the patient's condition, acknowledged ahead of the rest
    pub fn is_clinical(&self) -> bool {
        matches!(
            self,
            Topic::Breathing | Topic::Conscious | Topic::Bleeding | Topic::Trapped
        )
    }

    /// Question phrasings, chosen by turn index
    pub fn questions(&self) -> &'static [&'static str] {
        match self {
            Topic::Situation => &[
                "Can you tell me what happened?",
                "Please describe the emergency in a few words.",
            ],
            Topic::Breathing => &[
                "Is the person breathing?",
                "Can you check whether they are breathing normally?",
            ],
            Topic::Conscious => &[
                "Is the person conscious and responding to you?",
                "Are they awake and able to respond?",
            ],
            Topic::Location => &[
                "What is your exact location or address?",
                "Where are you right now? A street, building or landmark helps.",
            ],
            Topic::Bleeding => &[
                "Is there any heavy bleeding?",
                "Are they losing a lot of blood?",
            ],
            Topic::Name => &["What is the patient's name?", "Can you tell me the injured person's name?"],
            Topic::Age => &["How old is the patient?", "Roughly what age is the person?"],
            Topic::Trapped => &[
                "Is the person trapped or unable to move?",
                "Are they stuck under anything, or free to move?",
            ],
            Topic::Disaster => &[
                "What kind of disaster is this, for example an earthquake, flood, fire or explosion?",
                "What caused this? An earthquake, flood, fire, explosion or something else?",
            ],
            Topic::Victims => &[
                "How many people are injured?",
                "Is anyone else hurt, and how many people in total?",
            ],
            Topic::Dangers => &[
                "Are there any dangers nearby, like fire, gas, rising water or a risk of collapse?",
                "Is the area safe right now, or is there fire, gas, water or unstable structures?",
            ],
        }
    }

    /// Short acknowledgment once the topic is covered
    pub fn acknowledgment(&self) -> &'static str {
        match self {
            Topic::Situation => "Thank you for telling me what happened.",
            Topic::Breathing => "Understood about the breathing.",
            Topic::Conscious => "Thank you, noted whether they are responsive.",
            Topic::Location => "Got it, I have your location.",
            Topic::Bleeding => "Noted about the bleeding.",
            Topic::Name => "Thank you for the name.",
            Topic::Age => "Noted the age.",
            Topic::Trapped => "Noted whether they can move.",
            Topic::Disaster => "Noted what caused this.",
            Topic::Victims => "Noted the number of people.",
            Topic::Dangers => "Thank you, that helps the responders.",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Topic::Situation => &[
                "happened", "accident", "fell", "fall", "collapsed", "collapse", "injured",
                "injury", "hurt", "attack", "earthquake", "flood", "fire", "explosion", "crash",
                "bleeding", "pain", "trapped", "broken", "burn", "unconscious", "shot", "stabbed",
                "hit by", "wound", "drown", "storm", "bomb", "sick", "not breathing",
            ],
            Topic::Conscious => &[
                "conscious", "awake", "responsive", "responding", "passed out", "fainted",
                "talking", "alert",
            ],
            Topic::Breathing => &["breath", "choking"],
            Topic::Bleeding => &["bleed", "blood"],
            Topic::Name => &["name"],
            Topic::Age => &["years old", "year old", "y/o", "aged"],
            Topic::Location => &[
                "street", "road", "avenue", "address", "located", "district", "village",
                "block", "zone", "camp", "near the", "next to",
            ],
            Topic::Trapped => &[
                "trapped", "stuck", "pinned", "buried", "under debris", "can't move", "can move",
                "can walk", "free to move",
            ],
            Topic::Disaster => &[],
            Topic::Victims => &[
                "people", "victims", "alone", "only one", "only him", "only her", "nobody else",
                "no one else", "others",
            ],
            Topic::Dangers => &[
                "gas", "smoke", "fire", "water", "electric", "wire", "danger", "unstable",
                "safe", "hazard",
            ],
        }
    }

    fn known_in(&self, facts: &FactRecord) -> bool {
        match self {
            Topic::Situation | Topic::Disaster => facts.disaster_type.is_some(),
            Topic::Conscious => facts.is_conscious.is_some(),
            Topic::Breathing => facts.is_breathing.is_some(),
            Topic::Bleeding => facts.has_heavy_bleeding.is_some(),
            Topic::Name => facts.patient_name.is_some(),
            Topic::Age => facts.age.is_some(),
            Topic::Location => facts.location.is_some(),
            Topic::Trapped => facts.is_trapped.is_some(),
            Topic::Victims => facts.num_victims.is_some(),
            Topic::Dangers => facts.environmental_dangers.is_some(),
        }
    }
}

/// Topics covered anywhere in the caller's messages
pub fn covered_topics<S: AsRef<str>>(user_texts: &[S]) -> BTreeSet<Topic> {
    if user_texts.is_empty() {
        return BTreeSet::new();
    }
    let joined = user_texts
        .iter()
        .map(|t| t.as_ref().to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    let facts = HeuristicExtractor.extract(user_texts);

    TOPIC_PRIORITY
        .into_iter()
        .filter(|topic| {
            topic.known_in(&facts) || topic.keywords().iter().any(|k| joined.contains(k))
        })
        .collect()
}

/// Caller messages with bare yes/no answers rewritten as statements.
///
/// "no" right after "Is the person breathing?" becomes "the person is not
/// breathing", so coverage and extraction can read it.
pub fn expand_contextual_answers(turns: &[Turn]) -> Vec<String> {
    let mut asked: Option<Topic> = None;
    let mut expanded = Vec::new();

    for turn in turns {
        match turn.role {
            TurnRole::Assistant => asked = asked_topic(&turn.content),
            TurnRole::User => {
                let text = turn.content.trim();
                let statement = asked
                    .filter(|_| text.unicode_words().count() <= 3)
                    .and_then(|topic| parse_bool(text).and_then(|yes| statement_for(topic, yes)));
                expanded.push(statement.map_or_else(|| text.to_string(), str::to_string));
                asked = None;
            }
            TurnRole::System => {}
        }
    }
    expanded
}

/// Yes/no topic of the last question in an assistant message
fn asked_topic(assistant_text: &str) -> Option<Topic> {
    let before_mark = assistant_text.rsplit_once('?')?.0;
    let question = before_mark
        .rsplit(|c: char| matches!(c, '.' | '!' | '?' | '\n'))
        .next()
        .unwrap_or(before_mark)
        .to_lowercase();

    if question.contains("breath") {
        Some(Topic::Breathing)
    } else if ["conscious", "awake", "respond"].iter().any(|k| question.contains(k)) {
        Some(Topic::Conscious)
    } else if ["bleed", "blood"].iter().any(|k| question.contains(k)) {
        Some(Topic::Bleeding)
    } else if ["trapped", "stuck", "pinned"].iter().any(|k| question.contains(k)) {
        Some(Topic::Trapped)
    } else if ["danger", "hazard"].iter().any(|k| question.contains(k)) {
        Some(Topic::Dangers)
    } else {
        None
    }
}

fn statement_for(topic: Topic, yes: bool) -> Option<&'static str> {
    let statement = match (topic, yes) {
        (Topic::Breathing, true) => "the person is breathing",
        (Topic::Breathing, false) => "the person is not breathing",
        (Topic::Conscious, true) => "the person is conscious",
        (Topic::Conscious, false) => "the person is not conscious",
        (Topic::Bleeding, true) => "there is heavy bleeding",
        (Topic::Bleeding, false) => "there is no bleeding",
        (Topic::Trapped, true) => "the person is trapped",
        (Topic::Trapped, false) => "the person is not trapped",
        (Topic::Dangers, false) => "no dangers nearby",
        _ => return None,
    };
    Some(statement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_no_after_breathing_question() {
        let turns = vec![
            Turn::assistant("Thank you for telling me what happened. Is the person breathing?"),
            Turn::user("no"),
        ];
        assert_eq!(expand_contextual_answers(&turns), vec!["the person is not breathing"]);
    }

    #[test]
    fn test_only_last_question_counts() {
        let turns = vec![
            Turn::assistant("Understood about the breathing. Is the person conscious and responding to you?"),
            Turn::user("yes"),
        ];
        assert_eq!(expand_contextual_answers(&turns), vec!["the person is conscious"]);
    }

    #[test]
    fn test_long_answers_are_kept() {
        let turns = vec![
            Turn::assistant("Is there any heavy bleeding?"),
            Turn::user("no but his leg looks broken"),
            Turn::user("yes"),
        ];
        assert_eq!(
            expand_contextual_answers(&turns),
            vec!["no but his leg looks broken", "yes"]
        );
    }

    #[test]
    fn test_coverage() {
        let texts = ["There was an earthquake and my father is hurt", "the person is not breathing"];
        let covered = covered_topics(&texts);
        assert!(covered.contains(&Topic::Situation));
        assert!(covered.contains(&Topic::Disaster));
        assert!(covered.contains(&Topic::Breathing));
        assert!(!covered.contains(&Topic::Location));
        assert!(!covered.contains(&Topic::Name));
    }

    #[test]
    fn test_priority_order_matches_declaration() {
        let mut sorted = TOPIC_PRIORITY;
        sorted.sort();
        assert_eq!(sorted, TOPIC_PRIORITY);
        assert_eq!(TOPIC_PRIORITY.iter().filter(|t| t.is_essential()).count(), 4);
    }
}
