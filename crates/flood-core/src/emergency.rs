use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Triage level a citizen reports and a coordinator may override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmergencyLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for EmergencyLevel {
    fn default() -> Self {
        Self::Medium
    }
}

impl EmergencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for EmergencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmergencyLevel {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "normal" => Ok(Self::Medium),
            "high" | "urgent" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("critical".parse(), Ok(EmergencyLevel::Critical));
        assert_eq!(" High ".parse(), Ok(EmergencyLevel::High));
        assert_eq!("URGENT".parse(), Ok(EmergencyLevel::High));
        assert!("severe".parse::<EmergencyLevel>().is_err());
    }

    #[test]
    fn orders_by_severity() {
        assert!(EmergencyLevel::Critical > EmergencyLevel::High);
        assert!(EmergencyLevel::Low < EmergencyLevel::default());
    }
}
