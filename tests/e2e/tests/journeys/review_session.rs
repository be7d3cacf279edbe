//! Journey: a learner works through a review session
//!
//! Add items, review what is due, come back when the next items fall due.

use cadence_core::{Grade, ReviewLogStore, ReviewStateStore};
use cadence_e2e_tests::{TestDataFactory, TestDatabaseManager};
use chrono::{DateTime, Duration, Utc};

fn session_start() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_790_000_000, 0).unwrap()
}

#[test]
fn test_new_items_are_due_immediately() {
    let db = TestDatabaseManager::new_temp();
    let items = TestDataFactory::create_batch(&db.storage, 5, session_start());

    let due = db.due().due_items(session_start()).unwrap();
    assert_eq!(due.len(), 5);
    for entry in &due {
        assert!(entry.state.is_learning());
        assert_eq!(entry.state.ease_factor, 2.5);
        assert!(items.iter().any(|i| i.id == entry.item.id));
    }
}

#[test]
fn test_graded_items_leave_the_due_set() {
    let db = TestDatabaseManager::new_temp();
    let now = session_start();
    let items = TestDataFactory::create_batch(&db.storage, 4, now);
    let reviewer = db.reviewer();

    reviewer.apply_grade(&items[0].id, Grade::Good, now, Some(1800)).unwrap();
    reviewer.apply_grade(&items[1].id, Grade::Easy, now, Some(900)).unwrap();

    let due_ids: Vec<String> = db
        .due()
        .due_items(now)
        .unwrap()
        .into_iter()
        .map(|d| d.item.id)
        .collect();
    assert_eq!(due_ids.len(), 2);
    assert!(!due_ids.contains(&items[0].id));
    assert!(!due_ids.contains(&items[1].id));

    // A day later the good item is back; easy (1.5 days) is not
    let tomorrow = now + Duration::days(1);
    let due_ids: Vec<String> = db
        .due()
        .due_items(tomorrow)
        .unwrap()
        .into_iter()
        .map(|d| d.item.id)
        .collect();
    assert!(due_ids.contains(&items[0].id));
    assert!(!due_ids.contains(&items[1].id));
}

#[test]
fn test_successful_reviews_grow_the_interval() {
    let db = TestDatabaseManager::new_temp();
    let item = TestDataFactory::create_item(&db.storage, "bahay", "house", session_start());

    let outcomes = TestDataFactory::replay_grades(
        &db.reviewer(),
        &item.id,
        &[Grade::Good, Grade::Good, Grade::Good, Grade::Good],
        session_start(),
    );

    let intervals: Vec<f64> = outcomes.iter().map(|o| o.result.state.interval_days).collect();
    // 1.0, then 1.0 * 2.5, then 2.5 * 2.5 = 6.25 -> 6.3, then 6.3 * 2.5 = 15.75 -> 15.8
    assert_eq!(intervals, vec![1.0, 2.5, 6.3, 15.8]);

    let state = db.storage.get_state(&item.id).unwrap().unwrap();
    assert_eq!(state.repetition, 4);
    assert_eq!(state, outcomes[3].result.state);
}

#[test]
fn test_every_grading_is_logged_once() {
    let db = TestDatabaseManager::new_temp();
    let item = TestDataFactory::create_item(&db.storage, "kain", "eat", session_start());
    let grades = [Grade::Good, Grade::Hard, Grade::Again, Grade::Good, Grade::Easy];

    let outcomes =
        TestDataFactory::replay_grades(&db.reviewer(), &item.id, &grades, session_start());

    let logs = db.storage.logs_for_item(&item.id).unwrap();
    assert_eq!(logs.len(), grades.len());
    let logged: Vec<Grade> = logs.iter().map(|l| l.grade).collect();
    assert_eq!(logged, grades.to_vec());
    for (log, outcome) in logs.iter().zip(&outcomes) {
        assert_eq!(log, &outcome.log);
        assert_eq!(log.duration_ms, Some(1500));
    }
}

#[test]
fn test_session_survives_reopen() {
    let mut db = TestDatabaseManager::new_temp();
    let now = session_start();
    let item = TestDataFactory::create_item(&db.storage, "gabi", "night", now);
    db.reviewer().apply_grade(&item.id, Grade::Good, now, None).unwrap();

    db.reopen();

    let state = db.storage.get_state(&item.id).unwrap().unwrap();
    assert_eq!(state.repetition, 1);
    assert_eq!(state.due_at, now + Duration::days(1));
    assert_eq!(db.log_count(), 1);
    assert_eq!(db.due().due_count(now).unwrap(), 0);
}

#[test]
fn test_preview_matches_commit() {
    let db = TestDatabaseManager::new_temp();
    let now = session_start();
    let item = TestDataFactory::create_item(&db.storage, "araw", "sun; day", now);
    let reviewer = db.reviewer();

    let preview = reviewer.preview(&item.id, now).unwrap();
    let outcome = reviewer.apply_grade(&item.id, Grade::Hard, now, None).unwrap();

    assert_eq!(preview.hard, outcome.result);
}
