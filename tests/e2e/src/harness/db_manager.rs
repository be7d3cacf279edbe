//! Test Database Manager
//!
//! Provides isolated database instances for testing:
//! - Temporary databases that are automatically cleaned up
//! - Pre-seeded databases with items in known scheduling states
//! - Reopening the same file to check persistence

use std::path::PathBuf;

use cadence_core::{
    DueSetQuery, ItemLookup, LeechDetector, ReviewStateStore, Reviewer, SchedulerConfig,
    StatsAggregator, Storage, DEFAULT_CONFIG,
};
use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;

/// Manager for test databases
///
/// Creates isolated database instances for each test to prevent interference.
/// Automatically cleans up temporary databases when dropped.
///
/// # Example
///
/// ```rust,ignore
/// let db = TestDatabaseManager::new_temp();
///
/// let ids = db.seed_items(3, now);
/// db.reviewer().apply_grade(&ids[0], Grade::Good, now, None)?;
///
/// // Database is automatically deleted when `db` goes out of scope
/// ```
pub struct TestDatabaseManager {
    /// The storage instance
    pub storage: Storage,
    /// Scheduler config used by the helpers
    pub config: SchedulerConfig,
    /// Temporary directory (kept alive to prevent premature deletion)
    _temp_dir: Option<TempDir>,
    /// Path to the database file
    db_path: PathBuf,
}

impl TestDatabaseManager {
    /// Create a new test database in a temporary directory
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test_cadence.db");

        let storage = Storage::new(Some(db_path.clone())).expect("Failed to create test storage");

        Self {
            storage,
            config: DEFAULT_CONFIG,
            _temp_dir: Some(temp_dir),
            db_path,
        }
    }

    /// Create a test database at a specific path (not cleaned up)
    pub fn new_at_path(path: PathBuf) -> Self {
        let storage = Storage::new(Some(path.clone())).expect("Failed to create storage at path");

        Self {
            storage,
            config: DEFAULT_CONFIG,
            _temp_dir: None,
            db_path: path,
        }
    }

    /// Same database, different scheduler config
    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        config.validate().expect("Invalid test config");
        self.config = config;
        self
    }

    /// Get the database path
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Check if the database has no items
    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    /// Number of items
    pub fn item_count(&self) -> i64 {
        self.storage.item_count().unwrap_or(0)
    }

    /// Number of review logs
    pub fn log_count(&self) -> i64 {
        self.storage.log_count().unwrap_or(0)
    }

    // ========================================================================
    // VIEWS
    // ========================================================================

    /// Reviewer over this database with the manager's config
    pub fn reviewer(&self) -> Reviewer<'_, Storage> {
        Reviewer::new(&self.storage, self.config).expect("Invalid test config")
    }

    pub fn due(&self) -> DueSetQuery<'_, Storage, Storage> {
        DueSetQuery::new(&self.storage, &self.storage)
    }

    pub fn leeches(&self) -> LeechDetector<'_, Storage, Storage> {
        LeechDetector::new(&self.storage, &self.storage)
    }

    pub fn stats(&self) -> StatsAggregator<'_, Storage, Storage> {
        StatsAggregator::new(&self.storage, &self.storage)
    }

    // ========================================================================
    // SEEDING
    // ========================================================================

    /// Seed `count` fresh items, all due at `now`
    pub fn seed_items(&self, count: usize, now: DateTime<Utc>) -> Vec<String> {
        (0..count)
            .map(|i| {
                self.storage
                    .add_item(&format!("Front {}", i), &format!("Back {}", i), &self.config, now)
                    .expect("Failed to seed item")
                    .0
                    .id
            })
            .collect()
    }

    /// Seed one item per entry with that many lapses already recorded
    pub fn seed_with_lapses(&self, lapses: &[u32], now: DateTime<Utc>) -> Vec<String> {
        lapses
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let (item, mut state) = self
                    .storage
                    .add_item(&format!("Lapsed {}", i), "answer", &self.config, now)
                    .expect("Failed to seed item");
                state.lapse_count = count;
                self.storage.put_state(&state).expect("Failed to set lapses");
                item.id
            })
            .collect()
    }

    /// Seed items spread around `now`: returns (due ids, not-yet-due ids)
    pub fn seed_due_spread(&self, now: DateTime<Utc>) -> (Vec<String>, Vec<String>) {
        let offsets = [
            Duration::days(-3),
            Duration::hours(-2),
            Duration::seconds(-1),
            Duration::zero(),
            Duration::seconds(1),
            Duration::hours(1),
            Duration::days(4),
        ];

        let mut due = Vec::new();
        let mut later = Vec::new();
        for (i, offset) in offsets.into_iter().enumerate() {
            let (item, _) = self
                .storage
                .add_item(&format!("Spread {}", i), "answer", &self.config, now + offset)
                .expect("Failed to seed item");
            if offset <= Duration::zero() {
                due.push(item.id);
            } else {
                later.push(item.id);
            }
        }
        (due, later)
    }

    // ========================================================================
    // CLEANUP
    // ========================================================================

    /// Delete every seeded item (with state and logs)
    pub fn clear(&self, ids: &[String]) {
        for id in ids {
            let _ = self.storage.delete_item(id);
        }
    }

    /// Reopen the same file with a fresh connection pair
    pub fn reopen(&mut self) {
        self.storage =
            Storage::new(Some(self.db_path.clone())).expect("Failed to reopen storage");
    }

    /// Whether an item still has content
    pub fn has_item(&self, id: &str) -> bool {
        matches!(self.storage.get_item(id), Ok(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_790_000_000, 0).unwrap()
    }

    #[test]
    fn test_temp_database_creation() {
        let db = TestDatabaseManager::new_temp();
        assert!(db.is_empty());
        assert!(db.path().exists());
    }

    #[test]
    fn test_seed_items() {
        let db = TestDatabaseManager::new_temp();
        let ids = db.seed_items(10, now());

        assert_eq!(ids.len(), 10);
        assert_eq!(db.item_count(), 10);
        assert_eq!(db.due().due_count(now()).unwrap(), 10);
    }

    #[test]
    fn test_seed_due_spread() {
        let db = TestDatabaseManager::new_temp();
        let (due, later) = db.seed_due_spread(now());

        assert_eq!(due.len(), 4);
        assert_eq!(later.len(), 3);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let mut db = TestDatabaseManager::new_temp();
        let ids = db.seed_items(3, now());

        db.reopen();
        assert_eq!(db.item_count(), 3);
        assert!(db.has_item(&ids[0]));
    }

    #[test]
    fn test_clear_database() {
        let db = TestDatabaseManager::new_temp();
        let ids = db.seed_items(5, now());

        db.clear(&ids);
        assert!(db.is_empty());
        assert_eq!(db.due().due_count(now()).unwrap(), 0);
    }
}
