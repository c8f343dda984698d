//! Score to level mapping

use serde::{Deserialize, Serialize};

/// Stress level shown to the user and used for music selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StressLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl StressLevel {
    /// <30 Low, <60 Medium, else High
    pub fn from_score(score: u32) -> Self {
        if score < 30 {
            StressLevel::Low
        } else if score < 60 {
            StressLevel::Medium
        } else {
            StressLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StressLevel::Low => "Low",
            StressLevel::Medium => "Medium",
            StressLevel::High => "High",
        }
    }
}

impl std::fmt::Display for StressLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_boundaries() {
        assert_eq!(StressLevel::from_score(0), StressLevel::Low);
        assert_eq!(StressLevel::from_score(29), StressLevel::Low);
        assert_eq!(StressLevel::from_score(30), StressLevel::Medium);
        assert_eq!(StressLevel::from_score(59), StressLevel::Medium);
        assert_eq!(StressLevel::from_score(60), StressLevel::High);
        assert_eq!(StressLevel::from_score(100).to_string(), "High");
    }
}
