//! Per-item scheduling state and transition results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scheduling state of one memorization item (1:1 with the item)
///
/// Invariants maintained by the transition function:
/// - `ease_factor` stays within `[ease_factor_floor, EASE_FACTOR_CEILING]`
/// - `interval_days >= 0`, rounded to 0.1 day, never past [`LATEST_DUE_MILLIS`](crate::scheduler::LATEST_DUE_MILLIS)
/// - `lapse_count` never decreases
/// - `due_at` is the time of the last grading plus `interval_days`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    /// Item this state belongs to
    pub item_id: String,
    /// Days until the next presentation after the most recent grading
    pub interval_days: f64,
    /// Interval growth multiplier
    pub ease_factor: f64,
    /// 0 while learning, >0 once graduated to review
    pub repetition: u32,
    /// Item becomes eligible for presentation once now >= due_at
    pub due_at: DateTime<Utc>,
    /// Number of `again` grades ever received
    pub lapse_count: u32,
}

impl ReviewState {
    /// True while the item has not yet graduated
    pub fn is_learning(&self) -> bool {
        self.repetition == 0
    }

    /// True when the item is eligible for presentation at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_at <= now
    }
}

/// Outcome of grading a state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResult {
    /// New state to persist
    pub state: ReviewState,
    /// Derived from `lapse_count` and the configured threshold; never persisted
    pub is_leech: bool,
}

/// Outcome of every grade for one state, without committing any of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResults {
    pub again: ReviewResult,
    pub hard: ReviewResult,
    pub good: ReviewResult,
    pub easy: ReviewResult,
}

impl PreviewResults {
    /// Result for a specific grade
    pub fn for_grade(&self, grade: super::Grade) -> &ReviewResult {
        match grade {
            super::Grade::Again => &self.again,
            super::Grade::Hard => &self.hard,
            super::Grade::Good => &self.good,
            super::Grade::Easy => &self.easy,
        }
    }
}
