//! SQLite Storage Implementation
//!
//! Review states, review logs and the minimal item table, behind separate
//! reader/writer connections.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};

use super::error::{Result, StorageError};
use super::store::{GradeRecorder, ItemLookup, ReviewLogStore, ReviewStateStore};
use crate::review::{Item, ReviewLog};
use crate::scheduler::{initialize_state, Grade, ReviewState, SchedulerConfig};

const STATE_COLUMNS: &str =
    "item_id, interval_days, ease_factor, repetition, due_at, lapse_count";
const LOG_COLUMNS: &str = "id, item_id, logged_at, grade, duration_ms";

// ============================================================================
// STORAGE
// ============================================================================

/// SQLite-backed review store
///
/// Uses separate reader/writer connections for interior mutability.
/// All methods take `&self`, making Storage `Send + Sync` so callers can
/// share an `Arc<Storage>`.
pub struct Storage {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
    path: PathBuf,
}

impl Storage {
    /// Apply PRAGMAs to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -16000;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        Ok(())
    }

    /// Default database location in the platform data directory
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "cadence", "cadence").ok_or_else(|| {
            StorageError::Init("Could not determine project directories".to_string())
        })?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        // Restrict directory permissions to owner-only on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            let _ = std::fs::set_permissions(data_dir, perms);
        }
        Ok(data_dir.join("cadence.db"))
    }

    /// Open (or create) a database; `None` uses [`Storage::default_path`]
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => Self::default_path()?,
        };

        let writer_conn = Connection::open(&path)?;

        // Restrict database file permissions to owner-only on Unix
        #[cfg(unix)]
        if path.exists() {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&path, perms);
        }

        Self::configure_connection(&writer_conn)?;

        // Apply migrations on writer only
        let applied = super::migrations::apply_migrations(&writer_conn)?;
        if applied > 0 {
            tracing::debug!(path = %path.display(), applied, "Database schema migrated");
        }

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
            path,
        })
    }

    /// Path of the database file
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn writer(&self) -> Result<MutexGuard<'_, Connection>> {
        self.writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))
    }

    fn reader(&self) -> Result<MutexGuard<'_, Connection>> {
        self.reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))
    }

    // ========================================================================
    // ITEM PLUMBING
    // ========================================================================

    /// Create an item and its initial review state in one transaction
    pub fn add_item(
        &self,
        front: &str,
        back: &str,
        config: &SchedulerConfig,
        now: DateTime<Utc>,
    ) -> Result<(Item, ReviewState)> {
        let item = Item::new(front, back, now);
        let state = initialize_state(item.id.clone(), config, now);

        let mut writer = self.writer()?;
        let tx = writer.transaction()?;
        tx.execute(
            "INSERT INTO items (id, front, back, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                item.id,
                item.front,
                item.back,
                format_timestamp(&now),
                format_timestamp(&now),
            ],
        )?;
        upsert_state(&tx, &state)?;
        tx.commit()?;

        tracing::debug!(item_id = %item.id, "Item created");
        Ok((item, state))
    }

    /// Delete an item with its review state and logs
    pub fn delete_item(&self, id: &str) -> Result<bool> {
        let mut writer = self.writer()?;
        let tx = writer.transaction()?;
        let rows = tx.execute("DELETE FROM items WHERE id = ?1", params![id])?;
        tx.execute("DELETE FROM review_states WHERE item_id = ?1", params![id])?;
        let logs = tx.execute("DELETE FROM review_logs WHERE item_id = ?1", params![id])?;
        tx.commit()?;

        if rows > 0 {
            tracing::debug!(item_id = %id, logs_removed = logs, "Item deleted");
        }
        Ok(rows > 0)
    }

    /// Number of items
    pub fn item_count(&self) -> Result<i64> {
        let reader = self.reader()?;
        Ok(reader.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?)
    }

    /// Number of review logs
    pub fn log_count(&self) -> Result<i64> {
        let reader = self.reader()?;
        Ok(reader.query_row("SELECT COUNT(*) FROM review_logs", [], |row| row.get(0))?)
    }

    // ========================================================================
    // ROW MAPPING
    // ========================================================================

    /// Parse RFC3339 timestamp
    fn parse_timestamp(value: &str, field_name: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("Invalid {} timestamp '{}': {}", field_name, value, e),
                    )),
                )
            })
    }

    /// Convert a row to ReviewState
    fn row_to_state(row: &rusqlite::Row) -> rusqlite::Result<ReviewState> {
        let due_at: String = row.get("due_at")?;

        Ok(ReviewState {
            item_id: row.get("item_id")?,
            interval_days: row.get("interval_days")?,
            ease_factor: row.get("ease_factor")?,
            repetition: row.get("repetition")?,
            due_at: Self::parse_timestamp(&due_at, "due_at")?,
            lapse_count: row.get("lapse_count")?,
        })
    }

    /// Convert a row to a log whose grade is still unparsed
    fn row_to_log(row: &rusqlite::Row) -> rusqlite::Result<LogRow> {
        let logged_at: String = row.get("logged_at")?;
        let duration_ms: Option<i64> = row.get("duration_ms")?;

        Ok(LogRow {
            id: row.get("id")?,
            item_id: row.get("item_id")?,
            logged_at: Self::parse_timestamp(&logged_at, "logged_at")?,
            grade: row.get("grade")?,
            duration_ms: duration_ms.and_then(|ms| u64::try_from(ms).ok()),
        })
    }

    /// Convert a row to Item
    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<Item> {
        let created_at: String = row.get("created_at")?;

        Ok(Item {
            id: row.get("id")?,
            front: row.get("front")?,
            back: row.get("back")?,
            created_at: Self::parse_timestamp(&created_at, "created_at")?,
        })
    }

    fn query_states(
        &self,
        sql: &str,
        param: impl rusqlite::ToSql,
    ) -> Result<Vec<ReviewState>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(sql)?;
        let rows = stmt.query_map(params![param], Self::row_to_state)?;

        let mut result = Vec::new();
        for state in rows {
            result.push(state?);
        }
        Ok(result)
    }

    fn query_logs(&self, sql: &str, param: impl rusqlite::ToSql) -> Result<Vec<ReviewLog>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(sql)?;
        let rows = stmt.query_map(params![param], Self::row_to_log)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?.into_log()?);
        }
        Ok(result)
    }
}

/// Review log as stored, before the grade text is validated
struct LogRow {
    id: String,
    item_id: String,
    logged_at: DateTime<Utc>,
    grade: String,
    duration_ms: Option<u64>,
}

impl LogRow {
    fn into_log(self) -> Result<ReviewLog> {
        let grade: Grade = self.grade.parse()?;
        Ok(ReviewLog {
            id: self.id,
            item_id: self.item_id,
            logged_at: self.logged_at,
            grade,
            duration_ms: self.duration_ms,
        })
    }
}

/// Fixed-width RFC3339 (nanoseconds, `Z`), so text order matches time order
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn upsert_state(conn: &Connection, state: &ReviewState) -> Result<()> {
    conn.execute(
        "INSERT INTO review_states (
            item_id, interval_days, ease_factor, repetition, due_at, lapse_count
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(item_id) DO UPDATE SET
            interval_days = excluded.interval_days,
            ease_factor = excluded.ease_factor,
            repetition = excluded.repetition,
            due_at = excluded.due_at,
            lapse_count = excluded.lapse_count",
        params![
            state.item_id,
            state.interval_days,
            state.ease_factor,
            state.repetition,
            format_timestamp(&state.due_at),
            state.lapse_count,
        ],
    )?;
    Ok(())
}

fn insert_log(conn: &Connection, log: &ReviewLog) -> Result<()> {
    let duration_ms = log.duration_ms.map(|ms| i64::try_from(ms).unwrap_or(i64::MAX));
    let inserted = conn.execute(
        "INSERT INTO review_logs (id, item_id, logged_at, grade, duration_ms)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            log.id,
            log.item_id,
            format_timestamp(&log.logged_at),
            log.grade.as_str(),
            duration_ms,
        ],
    );

    match inserted {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            Err(StorageError::DuplicateLog(log.id.clone()))
        }
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// STORE CONTRACTS
// ============================================================================

impl ReviewStateStore for Storage {
    fn get_state(&self, item_id: &str) -> Result<Option<ReviewState>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(&format!(
            "SELECT {STATE_COLUMNS} FROM review_states WHERE item_id = ?1"
        ))?;

        let state = stmt
            .query_row(params![item_id], Self::row_to_state)
            .optional()?;
        Ok(state)
    }

    fn put_state(&self, state: &ReviewState) -> Result<()> {
        let writer = self.writer()?;
        upsert_state(&writer, state)
    }

    fn states_due_by(&self, at: DateTime<Utc>) -> Result<Vec<ReviewState>> {
        self.query_states(
            &format!(
                "SELECT {STATE_COLUMNS} FROM review_states
                 WHERE due_at <= ?1
                 ORDER BY due_at ASC, item_id ASC"
            ),
            format_timestamp(&at),
        )
    }

    fn count_due_by(&self, at: DateTime<Utc>) -> Result<i64> {
        let reader = self.reader()?;
        Ok(reader.query_row(
            "SELECT COUNT(*) FROM review_states WHERE due_at <= ?1",
            params![format_timestamp(&at)],
            |row| row.get(0),
        )?)
    }

    fn states_with_min_lapses(&self, min_lapses: u32) -> Result<Vec<ReviewState>> {
        self.query_states(
            &format!(
                "SELECT {STATE_COLUMNS} FROM review_states
                 WHERE lapse_count >= ?1
                 ORDER BY lapse_count DESC, item_id ASC"
            ),
            min_lapses,
        )
    }
}

impl ReviewLogStore for Storage {
    fn get_log(&self, id: &str) -> Result<Option<ReviewLog>> {
        let reader = self.reader()?;
        let mut stmt =
            reader.prepare(&format!("SELECT {LOG_COLUMNS} FROM review_logs WHERE id = ?1"))?;

        let row = stmt.query_row(params![id], Self::row_to_log).optional()?;
        row.map(LogRow::into_log).transpose()
    }

    fn append_log(&self, log: &ReviewLog) -> Result<()> {
        let writer = self.writer()?;
        insert_log(&writer, log)
    }

    fn logs_since(&self, since: DateTime<Utc>) -> Result<Vec<ReviewLog>> {
        self.query_logs(
            &format!(
                "SELECT {LOG_COLUMNS} FROM review_logs
                 WHERE logged_at >= ?1
                 ORDER BY logged_at ASC, id ASC"
            ),
            format_timestamp(&since),
        )
    }

    fn logs_for_item(&self, item_id: &str) -> Result<Vec<ReviewLog>> {
        self.query_logs(
            &format!(
                "SELECT {LOG_COLUMNS} FROM review_logs
                 WHERE item_id = ?1
                 ORDER BY logged_at ASC, id ASC"
            ),
            item_id,
        )
    }
}

impl ItemLookup for Storage {
    fn get_item(&self, id: &str) -> Result<Option<Item>> {
        let reader = self.reader()?;
        let mut stmt =
            reader.prepare("SELECT id, front, back, created_at FROM items WHERE id = ?1")?;

        let item = stmt.query_row(params![id], Self::row_to_item).optional()?;
        Ok(item)
    }
}

impl GradeRecorder for Storage {
    /// State upsert and log insert in a single transaction
    fn commit_grading(&self, state: &ReviewState, log: &ReviewLog) -> Result<()> {
        let mut writer = self.writer()?;
        let tx = writer.transaction()?;
        upsert_state(&tx, state)?;
        insert_log(&tx, log)?;
        tx.commit()?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
