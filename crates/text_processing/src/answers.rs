//! Short-answer parsing for fixed-form questions
//!
//! Answers that cannot be read come back as `None`; nothing here fails.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::phrases::PolarPhrases;

static YES_NO: Lazy<PolarPhrases> = Lazy::new(|| {
    PolarPhrases::new(
        &[
            "not conscious",
            "not breathing",
            "unconscious",
            "unresponsive",
            "he is not",
            "she is not",
            "they are not",
            "isn't",
            "aren't",
            "no",
            "nope",
            "negative",
            "not really",
            "i don't think so",
            "لا",
        ],
        &[
            "yes",
            "yeah",
            "yep",
            "correct",
            "affirmative",
            "he is",
            "she is",
            "they are",
            "breathing",
            "conscious",
            "نعم",
        ],
    )
});

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Yes/no answer. Negative phrasings are checked first.
pub fn parse_bool(raw: &str) -> Option<bool> {
    YES_NO.resolve(raw.trim())
}

/// Whole number from digits or English number words
pub fn parse_number(raw: &str) -> Option<u32> {
    if let Some(m) = DIGITS.find(raw) {
        if let Ok(n) = m.as_str().parse::<u32>() {
            return Some(n);
        }
    }
    parse_number_words(raw)
}

/// Value of a single number word
pub fn number_word(word: &str) -> Option<u32> {
    let value = match word {
        "zero" => 0,
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "sixteen" => 16,
        "seventeen" => 17,
        "eighteen" => 18,
        "nineteen" => 19,
        "twenty" => 20,
        "thirty" => 30,
        "forty" => 40,
        "fifty" => 50,
        "sixty" => 60,
        "seventy" => 70,
        "eighty" => 80,
        "ninety" => 90,
        _ => return None,
    };
    Some(value)
}

fn parse_number_words(raw: &str) -> Option<u32> {
    let lower = raw.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphabetic())
        .filter(|t| !t.is_empty())
        .collect();

    let mut total: Option<u32> = None;
    for (i, token) in tokens.iter().copied().enumerate() {
        if token == "hundred" {
            total = Some(total.unwrap_or(1).max(1).checked_mul(100)?);
        } else if token == "a" && tokens.get(i + 1) == Some(&"hundred") {
            total = Some(1);
        } else if token == "and" && total.is_some() {
            continue;
        } else if let Some(n) = number_word(token) {
            total = Some(total.unwrap_or(0).checked_add(n)?);
        } else if total.is_some() {
            break;
        }
    }
    total
}
