//! Database Migrations
//!
//! Schema migration definitions for the storage layer.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: items, review states, review logs",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Per-item review history and lapse lookups",
        up: MIGRATION_V2_UP,
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

/// V1: Initial schema
///
/// Timestamps are fixed-width RFC3339 UTC text, so text order is time order
/// and the `due_at` / `logged_at` range scans can use plain indexes.
const MIGRATION_V1_UP: &str = r#"
-- Presentable content, owned by the item collaborator
CREATE TABLE IF NOT EXISTS items (
    id TEXT PRIMARY KEY,
    front TEXT NOT NULL,
    back TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- One scheduling state per item. No foreign key: item removal may precede
-- state cleanup, and readers skip states whose item is gone.
CREATE TABLE IF NOT EXISTS review_states (
    item_id TEXT PRIMARY KEY,
    interval_days REAL NOT NULL DEFAULT 0 CHECK (interval_days >= 0),
    ease_factor REAL NOT NULL,
    repetition INTEGER NOT NULL DEFAULT 0 CHECK (repetition >= 0),
    due_at TEXT NOT NULL,
    lapse_count INTEGER NOT NULL DEFAULT 0 CHECK (lapse_count >= 0)
);

CREATE INDEX IF NOT EXISTS idx_states_due_at ON review_states(due_at);

-- Append-only grading events
CREATE TABLE IF NOT EXISTS review_logs (
    id TEXT PRIMARY KEY,
    item_id TEXT NOT NULL,
    logged_at TEXT NOT NULL,
    grade TEXT NOT NULL,
    duration_ms INTEGER CHECK (duration_ms IS NULL OR duration_ms >= 0)
);

CREATE INDEX IF NOT EXISTS idx_logs_logged_at ON review_logs(logged_at);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: Per-item review history and lapse lookups
const MIGRATION_V2_UP: &str = r#"
CREATE INDEX IF NOT EXISTS idx_logs_item ON review_logs(item_id, logged_at);
CREATE INDEX IF NOT EXISTS idx_states_lapse_count ON review_states(lapse_count);

UPDATE schema_version SET version = 2, applied_at = datetime('now');
"#;

/// Get current schema version from database
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Apply pending migrations
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );

            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
