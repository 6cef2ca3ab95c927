//! # Window Module
//!
//! Boundaries of the two usage windows: the 5-hour cycle on a fixed
//! epoch-anchored grid, and the calendar week starting Monday midnight.

use crate::utils::WINDOW_DURATION_SECONDS;
use chrono::{DateTime, Datelike, Days, LocalResult, TimeZone};

/// Start of the 5-hour bucket containing `now_secs`, anchored at the Unix epoch.
pub fn cycle_start(now_secs: i64) -> i64 {
    now_secs.div_euclid(WINDOW_DURATION_SECONDS) * WINDOW_DURATION_SECONDS
}

/// Most recent Monday 00:00 in `now`'s time zone, as epoch seconds.
pub fn week_start<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    let days_since_monday = u64::from(now.weekday().num_days_from_monday());
    let monday = now
        .date_naive()
        .checked_sub_days(Days::new(days_since_monday))
        .unwrap_or(now.date_naive());
    let midnight = monday.and_time(chrono::NaiveTime::MIN);
    match now.timezone().from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.timestamp(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp(),
        // Midnight skipped by a DST jump: the day starts at the first valid instant
        LocalResult::None => now
            .timezone()
            .from_local_datetime(&(midnight + chrono::TimeDelta::hours(1)))
            .earliest()
            .map(|dt| dt.timestamp())
            .unwrap_or_else(|| midnight.and_utc().timestamp()),
    }
}

/// Both window starts for one evaluation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub cycle_start: i64,
    pub week_start: i64,
}

impl WindowBounds {
    pub fn at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        WindowBounds {
            cycle_start: cycle_start(now.timestamp()),
            week_start: week_start(now),
        }
    }
}
