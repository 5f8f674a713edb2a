//! Date parsing for Vietnamese day-first dates.

use chrono::{NaiveDate, NaiveDateTime};

/// Parse `d/m/yyyy` or `d-m-yyyy`.
pub fn parse_day_month_year(s: &str) -> Option<NaiveDate> {
    let normalized = s.trim().replace('-', "/");
    NaiveDate::parse_from_str(&normalized, "%d/%m/%Y").ok()
}

/// Parse `d/m/yyyy H:MM` (either date separator, any whitespace before the time).
pub fn parse_day_month_year_time(s: &str) -> Option<NaiveDateTime> {
    let normalized = s
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('-', "/");
    NaiveDateTime::parse_from_str(&normalized, "%d/%m/%Y %H:%M").ok()
}

/// Build a date from day/month/year parts inside the plausible bill range
/// (day 1-31, month 1-12, year 1900-2100).
pub fn plausible_date(day: &str, month: &str, year: &str) -> Option<NaiveDate> {
    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;

    if !(1..=31).contains(&day) || !(1..=12).contains(&month) || !plausible_year(year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Whether a bare year could be a billing year.
pub fn plausible_year(year: i32) -> bool {
    (1900..=2100).contains(&year)
}
