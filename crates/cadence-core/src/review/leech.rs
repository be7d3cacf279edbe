//! Leech detection

use super::DueItem;
use crate::scheduler::is_leech;
use crate::storage::{ItemLookup, Result, ReviewStateStore};

/// Finds items whose lapse count has reached a threshold
///
/// Leech status is always derived from `lapse_count` at read time.
pub struct LeechDetector<'a, S: ?Sized, I: ?Sized> {
    states: &'a S,
    items: &'a I,
}

impl<'a, S, I> LeechDetector<'a, S, I>
where
    S: ReviewStateStore + ?Sized,
    I: ItemLookup + ?Sized,
{
    pub fn new(states: &'a S, items: &'a I) -> Self {
        Self { states, items }
    }

    /// Leeches with their content, most lapses first. Orphans are skipped.
    pub fn leeches(&self, threshold: u32) -> Result<Vec<DueItem>> {
        let mut found = Vec::new();
        for state in self.states.states_with_min_lapses(threshold)? {
            debug_assert!(is_leech(state.lapse_count, threshold));
            if let Some(item) = self.items.get_item(&state.item_id)? {
                found.push(DueItem { item, state });
            }
        }
        Ok(found)
    }

    /// Number of leech states in the whole store
    pub fn leech_count(&self, threshold: u32) -> Result<i64> {
        let count = self
            .states
            .states_with_min_lapses(threshold)?
            .iter()
            .filter(|s| is_leech(s.lapse_count, threshold))
            .count();
        Ok(count as i64)
    }
}
