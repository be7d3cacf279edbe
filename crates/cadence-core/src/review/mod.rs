//! Review module - grading events and the read-side views over them
//!
//! - [`Reviewer`]: the single "apply a grade" boundary operation
//! - [`DueSetQuery`]: items eligible for presentation now
//! - [`LeechDetector`]: items whose lapse count reached a threshold
//! - [`StatsAggregator`]: daily grade counts plus a leech snapshot

mod due;
mod leech;
mod reviewer;
mod stats;

pub use due::DueSetQuery;
pub use leech::LeechDetector;
pub use reviewer::{GradeOutcome, Reviewer};
pub use stats::{day_start_in, local_day_start, StatsAggregator};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scheduler::{Grade, ReviewState};

// ============================================================================
// REVIEW LOG
// ============================================================================

/// One immutable grading event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLog {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Item that was graded
    pub item_id: String,
    /// When the grade was recorded
    pub logged_at: DateTime<Utc>,
    /// The grade given
    pub grade: Grade,
    /// Response latency in milliseconds, if measured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl ReviewLog {
    /// New log entry with a fresh id
    pub fn new(
        item_id: impl Into<String>,
        grade: Grade,
        logged_at: DateTime<Utc>,
        duration_ms: Option<u64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            item_id: item_id.into(),
            logged_at,
            grade,
            duration_ms,
        }
    }
}

// ============================================================================
// ITEMS
// ============================================================================

/// Presentable content of a memorization item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Prompt side
    pub front: String,
    /// Answer side
    pub back: String,
    /// When the item was created
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// New item with a fresh id; surrounding whitespace is trimmed
    pub fn new(front: &str, back: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            front: front.trim().to_string(),
            back: back.trim().to_string(),
            created_at,
        }
    }
}

/// An item joined with its scheduling state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueItem {
    pub item: Item,
    pub state: ReviewState,
}

// ============================================================================
// STATISTICS
// ============================================================================

/// Running per-grade counts for one review session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTally {
    pub again: i64,
    pub hard: i64,
    pub good: i64,
    pub easy: i64,
}

impl SessionTally {
    /// Count one grade
    pub fn record(&mut self, grade: Grade) {
        match grade {
            Grade::Again => self.again += 1,
            Grade::Hard => self.hard += 1,
            Grade::Good => self.good += 1,
            Grade::Easy => self.easy += 1,
        }
    }

    /// Count for a specific grade
    pub fn count(&self, grade: Grade) -> i64 {
        match grade {
            Grade::Again => self.again,
            Grade::Hard => self.hard,
            Grade::Good => self.good,
            Grade::Easy => self.easy,
        }
    }

    /// Total grades recorded
    pub fn total(&self) -> i64 {
        self.again + self.hard + self.good + self.easy
    }

    /// `(good + easy) / total`, or `None` before the first grade
    pub fn accuracy(&self) -> Option<f64> {
        accuracy(self.good + self.easy, self.total())
    }
}

impl FromIterator<Grade> for SessionTally {
    fn from_iter<I: IntoIterator<Item = Grade>>(iter: I) -> Self {
        let mut tally = SessionTally::default();
        for grade in iter {
            tally.record(grade);
        }
        tally
    }
}

/// Summary of one day's reviews
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    /// Logs in the window
    pub reviewed: i64,
    pub again_count: i64,
    pub hard_count: i64,
    pub good_count: i64,
    pub easy_count: i64,
    /// Leeches across the whole store, not just the window
    pub leech_count: i64,
}

impl DailyStats {
    /// Build from a tally of the window plus a leech snapshot
    pub fn from_tally(tally: SessionTally, leech_count: i64) -> Self {
        Self {
            reviewed: tally.total(),
            again_count: tally.again,
            hard_count: tally.hard,
            good_count: tally.good,
            easy_count: tally.easy,
            leech_count,
        }
    }

    /// `(good + easy) / reviewed`, or `None` when nothing was reviewed
    pub fn accuracy(&self) -> Option<f64> {
        accuracy(self.good_count + self.easy_count, self.reviewed)
    }
}

fn accuracy(correct: i64, total: i64) -> Option<f64> {
    (total > 0).then(|| correct as f64 / total as f64)
}
