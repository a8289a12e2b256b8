//! Ordinal urgency scale

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity tier.
///
/// Variants are declared from least to most urgent so the derived `Ord`
/// gives `Critical > High > Moderate > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    /// One tier up, saturating at `Critical`
    pub fn bumped(self) -> Self {
        match self {
            Severity::Low => Severity::Moderate,
            Severity::Moderate => Severity::High,
            Severity::High | Severity::Critical => Severity::Critical,
        }
    }

    /// Response priority a tier starts from (1 = most urgent)
    pub fn base_priority(self) -> u8 {
        match self {
            Severity::Critical => 1,
            Severity::High => 3,
            Severity::Moderate => 5,
            Severity::Low => 8,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Moderate => "MODERATE",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Severity::Low),
            "MODERATE" | "MEDIUM" => Ok(Severity::Moderate),
            "HIGH" => Ok(Severity::High),
            "CRITICAL" => Ok(Severity::Critical),
            other => Err(format!("unknown severity: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_order() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Moderate);
        assert!(Severity::Moderate > Severity::Low);
    }

    #[test]
    fn test_bump_saturates() {
        assert_eq!(Severity::Low.bumped(), Severity::Moderate);
        assert_eq!(Severity::High.bumped(), Severity::Critical);
        assert_eq!(Severity::Critical.bumped(), Severity::Critical);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("critical".parse::<Severity>().unwrap(), Severity::Critical);
        assert_eq!(" High ".parse::<Severity>().unwrap(), Severity::High);
        assert!("urgent".parse::<Severity>().is_err());
    }

    #[test]
    fn test_serde_uppercase() {
        let json = serde_json::to_string(&Severity::Moderate).unwrap();
        assert_eq!(json, "\"MODERATE\"");
    }
}
