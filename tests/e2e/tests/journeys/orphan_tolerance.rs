//! Journey: item content disappears while review data remains
//!
//! Readers skip states whose item is gone; grading still works on the state.

use cadence_core::{
    DueSetQuery, Grade, LeechDetector, MemoryStore, ReviewStateStore, Reviewer, StatsAggregator,
    DEFAULT_CONFIG,
};
use cadence_e2e_tests::TestDatabaseManager;
use chrono::{DateTime, Utc};

fn now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_790_000_000, 0).unwrap()
}

#[test]
fn test_due_set_skips_missing_items() {
    let store = MemoryStore::new();
    let (kept, _) = store.add_item("tubig", "water", &DEFAULT_CONFIG, now()).unwrap();
    let (gone, _) = store.add_item("bahay", "house", &DEFAULT_CONFIG, now()).unwrap();
    store.remove_item_only(&gone.id).unwrap();

    let query = DueSetQuery::new(&store, &store);
    let due = query.due_items(now()).unwrap();

    assert_eq!(due.len(), 1);
    assert_eq!(due[0].item.id, kept.id);
    // The orphaned state still exists
    assert!(store.get_state(&gone.id).unwrap().is_some());
}

#[test]
fn test_leech_list_skips_missing_items() {
    let store = MemoryStore::new();
    let (gone, mut state) = store.add_item("aso", "dog", &DEFAULT_CONFIG, now()).unwrap();
    state.lapse_count = 10;
    store.put_state(&state).unwrap();
    store.remove_item_only(&gone.id).unwrap();

    let detector = LeechDetector::new(&store, &store);
    assert!(detector.leeches(8).unwrap().is_empty());

    let stats = StatsAggregator::new(&store, &store).daily_stats(now(), 8).unwrap();
    assert_eq!(stats.leech_count, 1);
}

#[test]
fn test_grading_an_orphan_still_commits() {
    let store = MemoryStore::new();
    let (gone, _) = store.add_item("gabi", "night", &DEFAULT_CONFIG, now()).unwrap();
    store.remove_item_only(&gone.id).unwrap();

    let reviewer = Reviewer::new(&store, DEFAULT_CONFIG).unwrap();
    let outcome = reviewer.apply_grade(&gone.id, Grade::Good, now(), None).unwrap();
    assert_eq!(outcome.result.state.repetition, 1);
    assert_eq!(store.log_count().unwrap(), 1);
}

#[test]
fn test_deleting_an_item_removes_review_data() {
    let db = TestDatabaseManager::new_temp();
    let ids = db.seed_items(2, now());
    db.reviewer().apply_grade(&ids[0], Grade::Again, now(), None).unwrap();

    assert!(db.storage.delete_item(&ids[0]).unwrap());

    assert!(!db.has_item(&ids[0]));
    assert!(db.storage.get_state(&ids[0]).unwrap().is_none());
    assert_eq!(db.log_count(), 0);
    assert_eq!(db.due().due_count(now()).unwrap(), 1);
}
