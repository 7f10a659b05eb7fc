use anyhow::{anyhow, Result};
use chrono::{Datelike, Days, Locale, Months, NaiveDate, NaiveTime};

use crate::storage::entities::WorkDays;

/// First and last calendar day of the month `date` falls into.
pub fn month_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date - Days::new(date.day0() as u64);
    let end = start + Months::new(1) - Days::new(1);
    (start, end)
}

/// Inclusive on both ends.
pub fn is_in_range<T: PartialOrd>(value: T, start: T, end: T) -> bool {
    start <= value && value <= end
}

/// Renders minutes as `HH:MM`. Hours are not wrapped, so 1500 minutes is `25:00`.
pub fn format_duration(total_minutes: u32) -> String {
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

/// Month name and year in the given locale, e.g. `Abril 2024` for `pt_BR`. Some locales spell
/// month names in lower case, so the first letter is always upper-cased.
pub fn format_month_label(date: NaiveDate, locale: Locale) -> String {
    let label = date
        .and_time(NaiveTime::MIN)
        .and_utc()
        .format_localized("%B %Y", locale)
        .to_string();
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => label,
    }
}

/// Number of days in `date`'s month that fall on one of `work_days`.
pub fn working_days_in_month(date: NaiveDate, work_days: &WorkDays) -> u32 {
    let (start, end) = month_range(date);
    count_working_days(start, end, work_days)
}

/// Working days from `from` (inclusive) to the end of its month.
pub fn remaining_working_days(from: NaiveDate, work_days: &WorkDays) -> u32 {
    let (_, end) = month_range(from);
    count_working_days(from, end, work_days)
}

fn count_working_days(start: NaiveDate, end: NaiveDate, work_days: &WorkDays) -> u32 {
    if work_days.is_empty() {
        return 0;
    }
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| work_days.contains(day.weekday()))
        .count() as u32
}

/// Parses either plain minutes (`90`) or `H:MM` (`1:30`).
pub fn parse_duration(value: &str) -> Result<u32> {
    let value = value.trim();
    match value.split_once(':') {
        Some((hours, minutes)) => {
            let hours = hours.trim().parse::<u32>()?;
            let minutes = minutes.trim().parse::<u32>()?;
            if minutes >= 60 {
                return Err(anyhow!("Minutes must be below 60 in {value}"));
            }
            hours
                .checked_mul(60)
                .and_then(|v| v.checked_add(minutes))
                .ok_or_else(|| anyhow!("Duration {value} is too large"))
        }
        None => Ok(value.parse::<u32>()?),
    }
}
