//! Displayed week.

use chrono::{Datelike, Days, NaiveDate};

/// Monday of the week shown for `date`.
///
/// Sunday rolls forward to the next day, so the timetable opened on a
/// Sunday shows the week about to start.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    let from_sunday = u64::from(date.weekday().num_days_from_sunday());
    if from_sunday == 0 {
        date.checked_add_days(Days::new(1)).unwrap_or(date)
    } else {
        date.checked_sub_days(Days::new(from_sunday - 1))
            .unwrap_or(date)
    }
}

/// `count` consecutive days from `start`.
pub fn week_days(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    start.iter_days().take(count).collect()
}

/// Moves a displayed week by `weeks` (negative goes back).
pub fn shift_week(start: NaiveDate, weeks: i64) -> NaiveDate {
    let days = Days::new(weeks.unsigned_abs() * 7);
    let shifted = if weeks < 0 {
        start.checked_sub_days(days)
    } else {
        start.checked_add_days(days)
    };
    shifted.unwrap_or(start)
}

/// Header label for `count` days from `start`, e.g. `1 - 6 Jan, 2024`.
///
/// Only the last day carries month and year.
pub fn week_range_label(start: NaiveDate, count: usize) -> String {
    let last = u64::try_from(count.saturating_sub(1))
        .ok()
        .and_then(|n| start.checked_add_days(Days::new(n)))
        .unwrap_or(start);
    format!("{} - {}", start.format("%-d"), last.format("%-d %b, %Y"))
}
