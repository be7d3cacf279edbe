//! SM-2 style transition function
//!
//! Two phases plus a universal failure transition:
//!
//! | Phase    | Grade | Effect                                                       |
//! |----------|-------|--------------------------------------------------------------|
//! | any      | again | lapse += 1, rep = 0, interval = step[0], ease += penalty     |
//! | learning | hard  | interval = step[1]; rep and ease unchanged                   |
//! | learning | good  | rep = 1, interval = graduating interval                      |
//! | learning | easy  | rep = 1, interval = graduating * 1.5, ease += 0.15           |
//! | review   | hard  | ease -= 0.15, interval = max(1, interval * 1.2), rep += 1    |
//! | review   | good  | interval *= ease, rep += 1                                   |
//! | review   | easy  | ease += 0.15, interval *= ease * 1.3, rep += 1               |
//!
//! Ease is clamped to `[floor, 2.7]`, intervals are rounded to 0.1 day and
//! `due_at = now + interval`. Nothing here reads a clock.

use chrono::{DateTime, Duration, Utc};

use super::config::SchedulerConfig;
use super::grade::Grade;
use super::state::{PreviewResults, ReviewResult, ReviewState};

/// Hard upper bound on the ease factor
pub const EASE_FACTOR_CEILING: f64 = 2.7;

/// Ease adjustment applied by `easy` (added) and review-phase `hard` (subtracted)
pub const EASE_STEP: f64 = 0.15;

/// Multiplier on the graduating interval for `easy` while learning
pub const EASY_GRADUATION_BONUS: f64 = 1.5;

/// Interval multiplier for review-phase `hard`
pub const HARD_INTERVAL_MULTIPLIER: f64 = 1.2;

/// Extra interval multiplier for review-phase `easy`
pub const EASY_INTERVAL_BONUS: f64 = 1.3;

/// Minimum interval for review-phase `hard`
pub const MIN_HARD_INTERVAL_DAYS: f64 = 1.0;

/// Minutes per day (learning steps are configured in minutes)
pub const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Create the state for a freshly created item: due immediately, learning phase
pub fn initialize_state(
    item_id: impl Into<String>,
    config: &SchedulerConfig,
    now: DateTime<Utc>,
) -> ReviewState {
    ReviewState {
        item_id: item_id.into(),
        interval_days: 0.0,
        ease_factor: config.ease_factor_start,
        repetition: 0,
        due_at: now,
        lapse_count: 0,
    }
}

/// Compute the next state for `grade` given at `now`
///
/// Pure: identical inputs always give identical output.
pub fn compute_next_review(
    state: &ReviewState,
    grade: Grade,
    config: &SchedulerConfig,
    now: DateTime<Utc>,
) -> ReviewResult {
    let mut interval_days = state.interval_days;
    let mut ease_factor = state.ease_factor;
    let mut repetition = state.repetition;
    let mut lapse_count = state.lapse_count;

    match (grade, state.is_learning()) {
        (Grade::Again, _) => {
            lapse_count = lapse_count.saturating_add(1);
            repetition = 0;
            interval_days = config.first_step_minutes() / MINUTES_PER_DAY;
            ease_factor = (ease_factor + config.lapse_penalty).max(config.ease_factor_floor);
        }

        // Learning phase
        (Grade::Hard, true) => {
            interval_days = config.second_step_minutes() / MINUTES_PER_DAY;
        }
        (Grade::Good, true) => {
            repetition = 1;
            interval_days = config.graduating_interval_days;
        }
        (Grade::Easy, true) => {
            repetition = 1;
            interval_days = config.graduating_interval_days * EASY_GRADUATION_BONUS;
            ease_factor = (ease_factor + EASE_STEP).min(EASE_FACTOR_CEILING);
        }

        // Review phase
        (Grade::Hard, false) => {
            ease_factor = (ease_factor - EASE_STEP).max(config.ease_factor_floor);
            interval_days = (interval_days * HARD_INTERVAL_MULTIPLIER).max(MIN_HARD_INTERVAL_DAYS);
            repetition = repetition.saturating_add(1);
        }
        (Grade::Good, false) => {
            interval_days *= ease_factor;
            repetition = repetition.saturating_add(1);
        }
        (Grade::Easy, false) => {
            ease_factor = (ease_factor + EASE_STEP).min(EASE_FACTOR_CEILING);
            interval_days = interval_days * ease_factor * EASY_INTERVAL_BONUS;
            repetition = repetition.saturating_add(1);
        }
    }

    let interval_days = round_interval(interval_days).min(max_interval_days(now));

    ReviewResult {
        state: ReviewState {
            item_id: state.item_id.clone(),
            interval_days,
            ease_factor,
            repetition,
            due_at: due_after(now, interval_days),
            lapse_count,
        },
        is_leech: is_leech(lapse_count, config.leech_threshold),
    }
}

/// Outcome of every grade for `state`, for showing what each button would do
pub fn preview_grades(
    state: &ReviewState,
    config: &SchedulerConfig,
    now: DateTime<Utc>,
) -> PreviewResults {
    PreviewResults {
        again: compute_next_review(state, Grade::Again, config, now),
        hard: compute_next_review(state, Grade::Hard, config, now),
        good: compute_next_review(state, Grade::Good, config, now),
        easy: compute_next_review(state, Grade::Easy, config, now),
    }
}

/// Leech status. Every component derives it through this function.
pub fn is_leech(lapse_count: u32, threshold: u32) -> bool {
    lapse_count >= threshold
}

/// Round to the nearest 0.1 day, ties away from zero
pub fn round_interval(days: f64) -> f64 {
    (days * 10.0).round() / 10.0
}

/// Latest due time handed out: 9999-12-31T23:59:59.999Z
///
/// Keeps every stored timestamp a four-digit-year RFC 3339 string.
pub const LATEST_DUE_MILLIS: i64 = 253_402_300_799_999;

/// Longest interval, in whole tenths of a day, that ends by [`LATEST_DUE_MILLIS`]
pub fn max_interval_days(now: DateTime<Utc>) -> f64 {
    let remaining = LATEST_DUE_MILLIS.saturating_sub(now.timestamp_millis()).max(0);
    ((remaining as f64 / MILLIS_PER_DAY) * 10.0).floor() / 10.0
}

/// `now + interval_days`, at millisecond resolution
///
/// Saturates at [`LATEST_DUE_MILLIS`] for intervals that would run past it.
pub fn due_after(now: DateTime<Utc>, interval_days: f64) -> DateTime<Utc> {
    let latest = DateTime::<Utc>::from_timestamp_millis(LATEST_DUE_MILLIS)
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let millis = (interval_days * MILLIS_PER_DAY).round();
    if !millis.is_finite() || millis >= i64::MAX as f64 {
        return latest;
    }
    Duration::try_milliseconds(millis as i64)
        .and_then(|delta| now.checked_add_signed(delta))
        .map_or(latest, |due| due.min(latest))
}

/// Intervals at or past this read as the largest year count
const MAX_FORMATTED_DAYS: f64 = 365.0 * 10_000.0;

/// Format an interval in days as a short human-readable string
pub fn format_interval(days: f64) -> String {
    if days.is_nan() || days <= 0.0 {
        return "now".to_string();
    }
    if days >= MAX_FORMATTED_DAYS {
        return format!("{}y+", (MAX_FORMATTED_DAYS / 365.0).floor());
    }

    let minutes = (days * MINUTES_PER_DAY).round();
    if minutes < 1.0 {
        "now".to_string()
    } else if minutes < 60.0 {
        format!("{}m", minutes)
    } else if days < 1.0 {
        format!("{}h", (days * 24.0).round())
    } else if days < 7.0 {
        format!("{}d", round_interval(days))
    } else if days < 30.0 {
        format!("{}w", (days / 7.0).floor())
    } else if days < 365.0 {
        format!("{}mo", (days / 30.0).floor())
    } else {
        format!("{}y", (days / 365.0).floor())
    }
}
