//! Recall grades
//!
//! The learner's self-reported recall quality for one presentation.

use serde::{Deserialize, Serialize};

/// Scheduler error type
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// A grade outside the four recognized values
    #[error("Invalid grade: {0} (expected again, hard, good or easy)")]
    InvalidGrade(String),
}

/// Recall grade for a single presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    /// Failed recall; counts as a lapse
    Again,
    /// Recalled with serious difficulty
    Hard,
    /// Recalled after some hesitation
    Good,
    /// Recalled effortlessly
    Easy,
}

impl Grade {
    /// All grades in key order (1..=4)
    pub const ALL: [Grade; 4] = [Grade::Again, Grade::Hard, Grade::Good, Grade::Easy];

    /// Map a grade key (1=Again, 2=Hard, 3=Good, 4=Easy)
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Grade::Again),
            2 => Some(Grade::Hard),
            3 => Some(Grade::Good),
            4 => Some(Grade::Easy),
            _ => None,
        }
    }

    /// Grade key (1..=4)
    pub fn as_i32(&self) -> i32 {
        match self {
            Grade::Again => 1,
            Grade::Hard => 2,
            Grade::Good => 3,
            Grade::Easy => 4,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Again => "again",
            Grade::Hard => "hard",
            Grade::Good => "good",
            Grade::Easy => "easy",
        }
    }

    /// True for the failure grade
    pub fn is_lapse(&self) -> bool {
        matches!(self, Grade::Again)
    }

    /// True for grades that count towards accuracy
    pub fn is_correct(&self) -> bool {
        matches!(self, Grade::Good | Grade::Easy)
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Grade {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "again" => Ok(Grade::Again),
            "hard" => Ok(Grade::Hard),
            "good" => Ok(Grade::Good),
            "easy" => Ok(Grade::Easy),
            _ => Err(SchedulerError::InvalidGrade(s.to_string())),
        }
    }
}
