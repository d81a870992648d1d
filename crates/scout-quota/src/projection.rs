//! Advisory exhaustion projection from trailing daily consumption.

use chrono::{Days, NaiveDate};

/// Date the remaining credits run out at the average daily rate over the
/// `window_days` ending at `today` (inclusive). `None` when nothing was spent.
pub fn projected_exhaustion(
    remaining: u64,
    daily_usage: &[(NaiveDate, u64)],
    today: NaiveDate,
    window_days: u32,
) -> Option<NaiveDate> {
    if remaining == 0 {
        return Some(today);
    }
    let window_days = window_days.max(1);
    let first_day = today.checked_sub_days(Days::new(u64::from(window_days) - 1))?;

    let spent: u64 = daily_usage
        .iter()
        .filter(|(day, _)| *day >= first_day && *day <= today)
        .map(|(_, credits)| credits)
        .sum();
    if spent == 0 {
        return None;
    }

    let daily_average = spent as f64 / f64::from(window_days);
    let days_left = (remaining as f64 / daily_average).ceil() as u64;
    today.checked_add_days(Days::new(days_left))
}
