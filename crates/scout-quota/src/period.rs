//! Calendar-month accounting periods anchored at a reset day.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// The `[start, end)` period containing `at`.
///
/// A period starts at 00:00 UTC on `reset_day` of a month and ends at the same
/// instant one month later. `reset_day` is clamped to 1..=28 so every month has it.
pub fn period_bounds(at: DateTime<Utc>, reset_day: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    let day = reset_day.clamp(1, 28);
    let (mut year, mut month) = (at.year(), at.month());
    if at.day() < day {
        (year, month) = previous_month(year, month);
    }
    let (next_year, next_month) = next_month(year, month);
    (
        midnight(year, month, day),
        midnight(next_year, next_month, day),
    )
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn midnight(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
