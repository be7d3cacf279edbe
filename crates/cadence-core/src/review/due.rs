//! Due set query

use chrono::{DateTime, Utc};

use super::DueItem;
use crate::storage::{ItemLookup, Result, ReviewStateStore};

/// Items eligible for presentation: every state with `due_at <= now`
///
/// States whose item no longer exists are skipped, never an error.
pub struct DueSetQuery<'a, S: ?Sized, I: ?Sized> {
    states: &'a S,
    items: &'a I,
}

impl<'a, S, I> DueSetQuery<'a, S, I>
where
    S: ReviewStateStore + ?Sized,
    I: ItemLookup + ?Sized,
{
    pub fn new(states: &'a S, items: &'a I) -> Self {
        Self { states, items }
    }

    /// Due items, earliest `due_at` first
    pub fn due_items(&self, now: DateTime<Utc>) -> Result<Vec<DueItem>> {
        let states = self.states.states_due_by(now)?;
        let mut due = Vec::with_capacity(states.len());

        for state in states {
            match self.items.get_item(&state.item_id)? {
                Some(item) => due.push(DueItem { item, state }),
                None => {
                    tracing::debug!(item_id = %state.item_id, "Skipping due state without item");
                }
            }
        }

        Ok(due)
    }

    /// Number of due states (orphans included)
    pub fn due_count(&self, now: DateTime<Utc>) -> Result<i64> {
        self.states.count_due_by(now)
    }
}
