//! Store contracts
//!
//! What the scheduler needs from whoever owns persistence. The SQLite
//! [`Storage`](super::Storage) and the in-process [`MemoryStore`](super::MemoryStore)
//! both implement every trait here.

use chrono::{DateTime, Utc};

use super::error::{Result, StorageError};
use crate::review::{Item, ReviewLog};
use crate::scheduler::ReviewState;

/// Keyed store of one scheduling state per item
pub trait ReviewStateStore {
    /// Point lookup by item id
    fn get_state(&self, item_id: &str) -> Result<Option<ReviewState>>;

    /// Insert or replace the state for `state.item_id`
    fn put_state(&self, state: &ReviewState) -> Result<()>;

    /// States with `due_at <= at`, ordered by `due_at` then `item_id`
    fn states_due_by(&self, at: DateTime<Utc>) -> Result<Vec<ReviewState>>;

    /// Number of states with `due_at <= at`
    fn count_due_by(&self, at: DateTime<Utc>) -> Result<i64> {
        Ok(self.states_due_by(at)?.len() as i64)
    }

    /// States with `lapse_count >= min_lapses`, ordered by lapse count descending
    fn states_with_min_lapses(&self, min_lapses: u32) -> Result<Vec<ReviewState>>;
}

/// Append-only store of grading events
pub trait ReviewLogStore {
    /// Point lookup by log id
    fn get_log(&self, id: &str) -> Result<Option<ReviewLog>>;

    /// Append a log; fails with [`StorageError::DuplicateLog`] if the id exists
    fn append_log(&self, log: &ReviewLog) -> Result<()>;

    /// Logs with `logged_at >= since`, oldest first, ties by id
    fn logs_since(&self, since: DateTime<Utc>) -> Result<Vec<ReviewLog>>;

    /// Every log for one item, oldest first, ties by id
    fn logs_for_item(&self, item_id: &str) -> Result<Vec<ReviewLog>>;
}

/// Lookup of presentable item content. Absence is not an error.
pub trait ItemLookup {
    fn get_item(&self, id: &str) -> Result<Option<Item>>;
}

/// Records one grading event: the new state and its log, together
pub trait GradeRecorder: ReviewStateStore + ReviewLogStore {
    /// Persist both writes of a grading event
    ///
    /// The default performs the two writes in sequence and reports
    /// [`StorageError::PartialCommit`] when the state landed but the log did
    /// not. Stores that can do better override it with an atomic commit.
    fn commit_grading(&self, state: &ReviewState, log: &ReviewLog) -> Result<()> {
        self.put_state(state)?;
        self.append_log(log).map_err(|e| {
            tracing::error!(
                item_id = %state.item_id,
                log_id = %log.id,
                "Review state updated but log append failed: {}",
                e
            );
            StorageError::PartialCommit(format!(
                "state for item {} updated, log {} not appended: {}",
                state.item_id, log.id, e
            ))
        })
    }
}
