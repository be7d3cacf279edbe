//! Apply-grade boundary operation

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::review::ReviewLog;
use crate::scheduler::{
    compute_next_review, preview_grades, ConfigError, Grade, PreviewResults, ReviewResult,
    SchedulerConfig,
};
use crate::storage::{GradeRecorder, Result, StorageError};

/// What a single grading produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeOutcome {
    /// Persisted state plus derived leech flag
    pub result: ReviewResult,
    /// Persisted log entry
    pub log: ReviewLog,
}

/// Records grades against a store
///
/// The only way grading reaches persistence: state update and log append
/// are committed together through [`GradeRecorder::commit_grading`].
pub struct Reviewer<'a, S: GradeRecorder + ?Sized> {
    store: &'a S,
    config: SchedulerConfig,
}

impl<'a, S: GradeRecorder + ?Sized> Reviewer<'a, S> {
    /// Create a reviewer; the config is validated up front
    pub fn new(store: &'a S, config: SchedulerConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// Same store, different config
    pub fn with_config(&self, config: SchedulerConfig) -> std::result::Result<Self, ConfigError> {
        Self::new(self.store, config)
    }

    /// Active config
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Grade `item_id` at `now` and persist the outcome
    ///
    /// Fails with [`StorageError::NotFound`] when the item has no review
    /// state; no state is fabricated.
    pub fn apply_grade(
        &self,
        item_id: &str,
        grade: Grade,
        now: DateTime<Utc>,
        duration_ms: Option<u64>,
    ) -> Result<GradeOutcome> {
        let state = self
            .store
            .get_state(item_id)?
            .ok_or_else(|| StorageError::NotFound(format!("review state for item {}", item_id)))?;

        let was_leech = crate::scheduler::is_leech(state.lapse_count, self.config.leech_threshold);
        let result = compute_next_review(&state, grade, &self.config, now);
        let log = ReviewLog::new(item_id, grade, now, duration_ms);

        self.store.commit_grading(&result.state, &log)?;

        tracing::debug!(
            item_id = %item_id,
            grade = %grade,
            interval_days = result.state.interval_days,
            ease_factor = result.state.ease_factor,
            repetition = result.state.repetition,
            "Grade applied"
        );
        if result.is_leech && !was_leech {
            tracing::info!(
                item_id = %item_id,
                lapse_count = result.state.lapse_count,
                threshold = self.config.leech_threshold,
                "Item became a leech"
            );
        }

        Ok(GradeOutcome { result, log })
    }

    /// Grade by numeric key: 1 = again, 2 = hard, 3 = good, 4 = easy
    pub fn apply_grade_key(
        &self,
        item_id: &str,
        key: i32,
        now: DateTime<Utc>,
        duration_ms: Option<u64>,
    ) -> Result<GradeOutcome> {
        let grade = Grade::from_i32(key)
            .ok_or_else(|| StorageError::InvalidGrade(format!("grade key {}", key)))?;
        self.apply_grade(item_id, grade, now, duration_ms)
    }

    /// What each grade would do to `item_id`, without writing anything
    pub fn preview(&self, item_id: &str, now: DateTime<Utc>) -> Result<PreviewResults> {
        let state = self
            .store
            .get_state(item_id)?
            .ok_or_else(|| StorageError::NotFound(format!("review state for item {}", item_id)))?;
        Ok(preview_grades(&state, &self.config, now))
    }
}
