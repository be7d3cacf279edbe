//! In-process store
//!
//! A `Mutex`-guarded implementation of every store contract. Useful for
//! embedding the scheduler without SQLite, and for tests.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::error::{Result, StorageError};
use super::store::{GradeRecorder, ItemLookup, ReviewLogStore, ReviewStateStore};
use crate::review::{Item, ReviewLog};
use crate::scheduler::{initialize_state, ReviewState, SchedulerConfig};

#[derive(Debug, Default)]
struct Inner {
    items: BTreeMap<String, Item>,
    states: BTreeMap<String, ReviewState>,
    /// Keyed by log id
    logs: BTreeMap<String, ReviewLog>,
}

/// In-memory review store
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Init("Memory store lock poisoned".into()))
    }

    /// Create an item together with its initial review state
    pub fn add_item(
        &self,
        front: &str,
        back: &str,
        config: &SchedulerConfig,
        now: DateTime<Utc>,
    ) -> Result<(Item, ReviewState)> {
        let item = Item::new(front, back, now);
        let state = initialize_state(item.id.clone(), config, now);

        let mut inner = self.lock()?;
        inner.items.insert(item.id.clone(), item.clone());
        inner.states.insert(state.item_id.clone(), state.clone());
        Ok((item, state))
    }

    /// Remove an item with its state and logs
    pub fn delete_item(&self, id: &str) -> Result<bool> {
        let mut inner = self.lock()?;
        let existed = inner.items.remove(id).is_some();
        inner.states.remove(id);
        inner.logs.retain(|_, log| log.item_id != id);
        Ok(existed)
    }

    /// Remove only the item, leaving its state and logs behind
    ///
    /// Models the window where the item collaborator has deleted content but
    /// review data cleanup has not run yet.
    pub fn remove_item_only(&self, id: &str) -> Result<bool> {
        Ok(self.lock()?.items.remove(id).is_some())
    }

    /// Number of items
    pub fn item_count(&self) -> Result<i64> {
        Ok(self.lock()?.items.len() as i64)
    }

    /// Number of review logs
    pub fn log_count(&self) -> Result<i64> {
        Ok(self.lock()?.logs.len() as i64)
    }
}

impl ReviewStateStore for MemoryStore {
    fn get_state(&self, item_id: &str) -> Result<Option<ReviewState>> {
        Ok(self.lock()?.states.get(item_id).cloned())
    }

    fn put_state(&self, state: &ReviewState) -> Result<()> {
        self.lock()?
            .states
            .insert(state.item_id.clone(), state.clone());
        Ok(())
    }

    fn states_due_by(&self, at: DateTime<Utc>) -> Result<Vec<ReviewState>> {
        let inner = self.lock()?;
        let mut due: Vec<ReviewState> = inner
            .states
            .values()
            .filter(|s| s.due_at <= at)
            .cloned()
            .collect();
        due.sort_by(|a, b| a.due_at.cmp(&b.due_at).then_with(|| a.item_id.cmp(&b.item_id)));
        Ok(due)
    }

    fn count_due_by(&self, at: DateTime<Utc>) -> Result<i64> {
        let inner = self.lock()?;
        Ok(inner.states.values().filter(|s| s.due_at <= at).count() as i64)
    }

    fn states_with_min_lapses(&self, min_lapses: u32) -> Result<Vec<ReviewState>> {
        let inner = self.lock()?;
        let mut leeches: Vec<ReviewState> = inner
            .states
            .values()
            .filter(|s| s.lapse_count >= min_lapses)
            .cloned()
            .collect();
        leeches.sort_by(|a, b| {
            b.lapse_count
                .cmp(&a.lapse_count)
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        Ok(leeches)
    }
}

impl ReviewLogStore for MemoryStore {
    fn get_log(&self, id: &str) -> Result<Option<ReviewLog>> {
        Ok(self.lock()?.logs.get(id).cloned())
    }

    fn append_log(&self, log: &ReviewLog) -> Result<()> {
        match self.lock()?.logs.entry(log.id.clone()) {
            Entry::Occupied(_) => Err(StorageError::DuplicateLog(log.id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(log.clone());
                Ok(())
            }
        }
    }

    fn logs_since(&self, since: DateTime<Utc>) -> Result<Vec<ReviewLog>> {
        let inner = self.lock()?;
        let mut logs: Vec<ReviewLog> = inner
            .logs
            .values()
            .filter(|log| log.logged_at >= since)
            .cloned()
            .collect();
        logs.sort_by(|a, b| a.logged_at.cmp(&b.logged_at).then_with(|| a.id.cmp(&b.id)));
        Ok(logs)
    }

    fn logs_for_item(&self, item_id: &str) -> Result<Vec<ReviewLog>> {
        let inner = self.lock()?;
        let mut logs: Vec<ReviewLog> = inner
            .logs
            .values()
            .filter(|log| log.item_id == item_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| a.logged_at.cmp(&b.logged_at).then_with(|| a.id.cmp(&b.id)));
        Ok(logs)
    }
}

impl ItemLookup for MemoryStore {
    fn get_item(&self, id: &str) -> Result<Option<Item>> {
        Ok(self.lock()?.items.get(id).cloned())
    }
}

impl GradeRecorder for MemoryStore {
    /// Both writes happen under one lock; a duplicate log id leaves the state untouched
    fn commit_grading(&self, state: &ReviewState, log: &ReviewLog) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.logs.contains_key(&log.id) {
            return Err(StorageError::DuplicateLog(log.id.clone()));
        }
        inner.states.insert(state.item_id.clone(), state.clone());
        inner.logs.insert(log.id.clone(), log.clone());
        Ok(())
    }
}
