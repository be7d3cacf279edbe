//! Daily statistics

use chrono::{DateTime, Duration, Local, TimeZone, Utc};

use super::{DailyStats, SessionTally};
use crate::scheduler::is_leech;
use crate::storage::{Result, ReviewLogStore, ReviewStateStore};

/// Aggregates the review log of one day plus a store-wide leech snapshot
pub struct StatsAggregator<'a, S: ?Sized, L: ?Sized> {
    states: &'a S,
    logs: &'a L,
}

impl<'a, S, L> StatsAggregator<'a, S, L>
where
    S: ReviewStateStore + ?Sized,
    L: ReviewLogStore + ?Sized,
{
    pub fn new(states: &'a S, logs: &'a L) -> Self {
        Self { states, logs }
    }

    /// Counts over logs with `logged_at >= day_start`
    ///
    /// `leech_count` is not windowed: it covers every state in the store.
    pub fn daily_stats(&self, day_start: DateTime<Utc>, leech_threshold: u32) -> Result<DailyStats> {
        let tally: SessionTally = self
            .logs
            .logs_since(day_start)?
            .into_iter()
            .map(|log| log.grade)
            .collect();

        let leech_count = self
            .states
            .states_with_min_lapses(leech_threshold)?
            .iter()
            .filter(|s| is_leech(s.lapse_count, leech_threshold))
            .count() as i64;

        Ok(DailyStats::from_tally(tally, leech_count))
    }
}

/// Midnight of the local day containing `now`
pub fn local_day_start(now: DateTime<Utc>) -> DateTime<Utc> {
    day_start_in(now, &Local)
}

/// Midnight, in `tz`, of the day containing `now`
///
/// When midnight does not exist in `tz` (a DST gap) the first valid hour
/// after it is used.
pub fn day_start_in<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let date = now.with_timezone(tz).date_naive();
    let Some(midnight) = date.and_hms_opt(0, 0, 0) else {
        return now;
    };

    (0..=3)
        .find_map(|hour| tz.from_local_datetime(&(midnight + Duration::hours(hour))).earliest())
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or(now)
}
