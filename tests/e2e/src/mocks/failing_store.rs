//! Store double whose log appends can be made to fail

use std::sync::atomic::{AtomicBool, Ordering};

use cadence_core::{
    GradeRecorder, Item, ItemLookup, MemoryStore, ReviewLog, ReviewLogStore, ReviewState,
    ReviewStateStore, StorageError,
};
use chrono::{DateTime, Utc};

/// Wraps a [`MemoryStore`] and rejects log appends while `fail_logs` is set
///
/// Keeps the default two-step `commit_grading`, so a rejected append
/// surfaces as [`StorageError::PartialCommit`].
#[derive(Default)]
pub struct LogFailingStore {
    pub inner: MemoryStore,
    fail_logs: AtomicBool,
}

impl LogFailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_logs(&self, fail: bool) {
        self.fail_logs.store(fail, Ordering::SeqCst);
    }
}

impl ReviewStateStore for LogFailingStore {
    fn get_state(&self, item_id: &str) -> cadence_core::Result<Option<ReviewState>> {
        self.inner.get_state(item_id)
    }

    fn put_state(&self, state: &ReviewState) -> cadence_core::Result<()> {
        self.inner.put_state(state)
    }

    fn states_due_by(&self, at: DateTime<Utc>) -> cadence_core::Result<Vec<ReviewState>> {
        self.inner.states_due_by(at)
    }

    fn states_with_min_lapses(&self, min_lapses: u32) -> cadence_core::Result<Vec<ReviewState>> {
        self.inner.states_with_min_lapses(min_lapses)
    }
}

impl ReviewLogStore for LogFailingStore {
    fn get_log(&self, id: &str) -> cadence_core::Result<Option<ReviewLog>> {
        self.inner.get_log(id)
    }

    fn append_log(&self, log: &ReviewLog) -> cadence_core::Result<()> {
        if self.fail_logs.load(Ordering::SeqCst) {
            return Err(StorageError::Init("review log unavailable".to_string()));
        }
        self.inner.append_log(log)
    }

    fn logs_since(&self, since: DateTime<Utc>) -> cadence_core::Result<Vec<ReviewLog>> {
        self.inner.logs_since(since)
    }

    fn logs_for_item(&self, item_id: &str) -> cadence_core::Result<Vec<ReviewLog>> {
        self.inner.logs_for_item(item_id)
    }
}

impl ItemLookup for LogFailingStore {
    fn get_item(&self, id: &str) -> cadence_core::Result<Option<Item>> {
        self.inner.get_item(id)
    }
}

impl GradeRecorder for LogFailingStore {}
