//! Weekend date arithmetic
//!
//! Computes the upcoming Saturday/Sunday pair and renders dates the way the
//! site labels its date options.

use chrono::{Datelike, Duration, FixedOffset, NaiveDate, Utc};

use crate::types::WeekendWindow;

/// Chinese weekday names, Monday first
const WEEKDAY_NAMES: [&str; 7] = [
    "星期一", "星期二", "星期三", "星期四", "星期五", "星期六", "星期日",
];

/// Today's calendar date in the given fixed offset.
pub fn today_in(offset: FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(&offset).date_naive()
}

/// Compute the weekend targeted from `today`.
///
/// A Saturday maps to itself; every other day maps to the following Saturday.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use wmoov_core::dates::weekend_for;
///
/// let wednesday = NaiveDate::from_ymd_opt(2026, 10, 21).unwrap();
/// let window = weekend_for(wednesday);
/// assert_eq!(window.saturday, NaiveDate::from_ymd_opt(2026, 10, 24).unwrap());
/// assert_eq!(window.sunday, NaiveDate::from_ymd_opt(2026, 10, 25).unwrap());
/// ```
pub fn weekend_for(today: NaiveDate) -> WeekendWindow {
    // Monday = 0 ... Sunday = 6, Saturday = 5
    let weekday = i64::from(today.weekday().num_days_from_monday());
    let offset = (5 - weekday).rem_euclid(7);

    let saturday = today + Duration::days(offset);
    WeekendWindow {
        saturday,
        sunday: saturday + Duration::days(1),
    }
}

/// Render a date as the site's date-option label, e.g. "10月24日 星期六".
pub fn date_option_label(date: NaiveDate) -> String {
    let weekday = WEEKDAY_NAMES[date.weekday().num_days_from_monday() as usize];
    format!("{}月{}日 {}", date.month(), date.day(), weekday)
}
