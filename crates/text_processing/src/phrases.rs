//! Phrase matching primitives
//!
//! Two matching modes are used across the crate:
//! - substring containment over lower-cased text, for the keyword tables
//! - word-bounded phrase sets, for yes/no style answers where "no" must
//!   not fire inside "know" or "nothing"

use regex::Regex;

/// Phrases from `phrases` contained in `text_lower`, in table order
pub(crate) fn all_contained<'a>(text_lower: &str, phrases: &[&'a str]) -> Vec<&'a str> {
    phrases
        .iter()
        .copied()
        .filter(|p| text_lower.contains(p))
        .collect()
}

/// Case-insensitive, word-bounded phrase set
#[derive(Debug, Clone)]
pub(crate) struct PhraseSet {
    patterns: Vec<(&'static str, Regex)>,
}

impl PhraseSet {
    /// Compile a phrase set. Only called from `Lazy` statics; phrases are
    /// escaped, so compilation cannot fail on their content.
    pub(crate) fn new(phrases: &[&'static str]) -> Self {
        let patterns = phrases
            .iter()
            .map(|p| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(p));
                (*p, Regex::new(&pattern).unwrap())
            })
            .collect();
        Self { patterns }
    }

    /// First phrase (in declaration order) found in `text`
    pub(crate) fn find(&self, text: &str) -> Option<&'static str> {
        self.patterns
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(p, _)| *p)
    }

    pub(crate) fn matches(&self, text: &str) -> bool {
        self.find(text).is_some()
    }
}

/// Negative and positive phrasings of one boolean fact.
///
/// Negatives are always checked first: "not conscious" must win over the
/// shorter positive "conscious" it contains.
#[derive(Debug, Clone)]
pub(crate) struct PolarPhrases {
    negative: PhraseSet,
    positive: PhraseSet,
}

impl PolarPhrases {
    pub(crate) fn new(negative: &[&'static str], positive: &[&'static str]) -> Self {
        Self {
            negative: PhraseSet::new(negative),
            positive: PhraseSet::new(positive),
        }
    }

    /// `Some(false)` on a negative match, `Some(true)` on a positive one,
    /// `None` when neither appears
    pub(crate) fn resolve(&self, text: &str) -> Option<bool> {
        if self.negative.matches(text) {
            Some(false)
        } else if self.positive.matches(text) {
            Some(true)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_set_respects_word_boundaries() {
        let set = PhraseSet::new(&["no"]);
        assert!(set.matches("No, he isn't"));
        assert!(!set.matches("I don't know"));
        assert!(!set.matches("nothing happened"));
    }

    #[test]
    fn test_polar_negative_first() {
        let polar = PolarPhrases::new(&["not conscious"], &["conscious"]);
        assert_eq!(polar.resolve("the patient is not conscious"), Some(false));
        assert_eq!(polar.resolve("she is conscious now"), Some(true));
        assert_eq!(polar.resolve("unclear"), None);
    }

    #[test]
    fn test_substring_helper() {
        let text = "a painful sprain and a wound";
        assert_eq!(all_contained(text, &["sprain", "pain", "wound", "cut"]).len(), 3);
    }
}
