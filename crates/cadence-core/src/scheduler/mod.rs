//! Scheduling Engine Module
//!
//! Pure SM-2 style transition function over per-item review state.
//!
//! ## Phases
//! - **Learning** (`repetition == 0`): fixed short steps, graduates on good/easy
//! - **Review** (`repetition > 0`): interval grows by the ease factor
//!
//! Any `again` grade is a lapse: it resets to the learning phase, applies the
//! lapse penalty to the ease factor and increments the lapse counter. Items
//! whose lapse count reaches the leech threshold are leeches.
//!
//! The current time is always an explicit argument.

mod algorithm;
mod config;
mod grade;
mod state;

pub use algorithm::{
    compute_next_review,
    due_after,
    format_interval,
    initialize_state,
    is_leech,
    max_interval_days,
    preview_grades,
    round_interval,
    // Constants
    EASE_FACTOR_CEILING,
    EASE_STEP,
    EASY_GRADUATION_BONUS,
    EASY_INTERVAL_BONUS,
    HARD_INTERVAL_MULTIPLIER,
    LATEST_DUE_MILLIS,
    MINUTES_PER_DAY,
    MIN_HARD_INTERVAL_DAYS,
};

pub use config::{ConfigError, SchedulerConfig, DEFAULT_CONFIG};
pub use grade::{Grade, SchedulerError};
pub use state::{PreviewResults, ReviewResult, ReviewState};
