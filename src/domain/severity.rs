use std::fmt;
use std::str::FromStr;

/// Severity is one of exactly three literals; anything else the LLM or a rule
/// produces is coerced to `Low` rather than rejected (see Classifier
/// normalization step).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Stable presentation-layer score, used by `/api/stats` to keep the
    /// average-severity number aligned with the UI's severity badges.
    pub fn score(self) -> f32 {
        match self {
            Severity::Low => 0.35,
            Severity::Medium => 0.60,
            Severity::High => 0.92,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = std::convert::Infallible;

    /// Never fails: unknown/garbled severity strings coerce to `Low`, matching
    /// the Classifier's "coerce to low if unknown" normalization rule.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "medium" | "mid" => Severity::Medium,
            "high" | "severe" => Severity::High,
            _ => Severity::Low,
        })
    }
}
