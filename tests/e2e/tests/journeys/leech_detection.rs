//! Journey: an item keeps getting forgotten until it is flagged as a leech

use cadence_core::{Grade, SchedulerConfig, DEFAULT_CONFIG};
use cadence_e2e_tests::{TestDataFactory, TestDatabaseManager};
use chrono::{DateTime, Utc};

fn start() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_790_000_000, 0).unwrap()
}

#[test]
fn test_eighth_lapse_makes_a_leech() {
    let db = TestDatabaseManager::new_temp();
    let item = TestDataFactory::create_item(&db.storage, "mabuti", "good; well", start());
    let reviewer = db.reviewer();

    let mut grades = Vec::new();
    for _ in 0..7 {
        grades.push(Grade::Again);
        grades.push(Grade::Good);
    }
    let outcomes = TestDataFactory::replay_grades(&reviewer, &item.id, &grades, start());
    assert!(outcomes.iter().all(|o| !o.result.is_leech));
    assert_eq!(db.leeches().leech_count(8).unwrap(), 0);

    let now = outcomes[outcomes.len() - 1].result.state.due_at;
    let outcome = reviewer.apply_grade(&item.id, Grade::Again, now, None).unwrap();
    assert!(outcome.result.is_leech);
    assert_eq!(outcome.result.state.lapse_count, 8);

    let leeches = db.leeches().leeches(8).unwrap();
    assert_eq!(leeches.len(), 1);
    assert_eq!(leeches[0].item.id, item.id);
    assert_eq!(leeches[0].item.front, "mabuti");
}

#[test]
fn test_leech_stays_a_leech_after_success() {
    let db = TestDatabaseManager::new_temp();
    let ids = db.seed_with_lapses(&[8], start());

    let outcome = db
        .reviewer()
        .apply_grade(&ids[0], Grade::Easy, start(), None)
        .unwrap();
    assert!(outcome.result.is_leech);
    assert_eq!(db.leeches().leech_count(8).unwrap(), 1);
}

#[test]
fn test_threshold_change_needs_no_migration() {
    let db = TestDatabaseManager::new_temp();
    db.seed_with_lapses(&[2, 4, 6, 9], start());

    assert_eq!(db.leeches().leech_count(8).unwrap(), 1);
    assert_eq!(db.leeches().leech_count(4).unwrap(), 3);

    let strict = SchedulerConfig {
        leech_threshold: 2,
        ..DEFAULT_CONFIG
    };
    let db = db.with_config(strict);
    let stats = db.stats().daily_stats(start(), db.config.leech_threshold).unwrap();
    assert_eq!(stats.leech_count, 4);
}

#[test]
fn test_leeches_ordered_by_lapses() {
    let db = TestDatabaseManager::new_temp();
    let ids = db.seed_with_lapses(&[9, 15, 8, 3], start());

    let order: Vec<String> = db
        .leeches()
        .leeches(8)
        .unwrap()
        .into_iter()
        .map(|l| l.item.id)
        .collect();
    assert_eq!(order, vec![ids[1].clone(), ids[0].clone(), ids[2].clone()]);
}
