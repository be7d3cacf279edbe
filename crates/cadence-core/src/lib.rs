//! # Cadence Core
//!
//! Spaced repetition scheduling engine:
//!
//! - **Scheduler**: pure SM-2 style transition over per-item review state
//! - **Lapse tracking**: every `again` grade is counted; items reaching the
//!   leech threshold are flagged at read time
//! - **Due sets**: items whose due time has passed
//! - **Daily stats**: per-grade counts for a day window plus a leech snapshot
//! - **Atomic grading**: the state update and its review log are committed together
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cadence_core::{Grade, Reviewer, Storage, DEFAULT_CONFIG};
//! use chrono::Utc;
//!
//! // Create storage (uses default platform-specific location)
//! let storage = Storage::new(None)?;
//! let (item, _) = storage.add_item("salamat", "thank you", &DEFAULT_CONFIG, Utc::now())?;
//!
//! // Grade it
//! let reviewer = Reviewer::new(&storage, DEFAULT_CONFIG)?;
//! let outcome = reviewer.apply_grade(&item.id, Grade::Good, Utc::now(), None)?;
//! println!("next review in {} days", outcome.result.state.interval_days);
//! ```
//!
//! ## Feature Flags
//!
//! - `bundled-sqlite` (default): statically link SQLite

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod review;
pub mod scheduler;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Scheduler
pub use scheduler::{
    compute_next_review,
    due_after,
    format_interval,
    initialize_state,
    is_leech,
    max_interval_days,
    preview_grades,
    round_interval,
    ConfigError,
    Grade,
    PreviewResults,
    ReviewResult,
    ReviewState,
    SchedulerConfig,
    SchedulerError,
    DEFAULT_CONFIG,
    EASE_FACTOR_CEILING,
};

// Review operations
pub use review::{
    day_start_in, local_day_start, DailyStats, DueItem, DueSetQuery, GradeOutcome, Item,
    LeechDetector, ReviewLog, Reviewer, SessionTally, StatsAggregator,
};

// Storage layer
pub use storage::{
    GradeRecorder, ItemLookup, MemoryStore, Result, ReviewLogStore, ReviewStateStore, Storage,
    StorageError,
};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        DailyStats, DueItem, DueSetQuery, Grade, GradeOutcome, GradeRecorder, Item, ItemLookup,
        LeechDetector, MemoryStore, Result, ReviewLog, ReviewLogStore, ReviewState,
        ReviewStateStore, Reviewer, SchedulerConfig, StatsAggregator, Storage, StorageError,
        DEFAULT_CONFIG,
    };
}
