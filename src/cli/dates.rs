use std::fmt::Display;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::ValueEnum;
use now::DateTimeNow;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

/// Parses a day like "yesterday", "friday", "15/03/2025" or "2025-03-15". Defaults to today.
pub fn parse_day(value: Option<&str>, style: DateStyle, now: DateTime<Local>) -> Result<NaiveDate> {
    let Some(value) = value else {
        return Ok(now.date_naive());
    };
    if let Ok(date) = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        return Ok(date);
    }
    parse_date_string(value, now, style.into())
        .map(|v| v.with_timezone(&Local).date_naive())
        .map_err(|e| anyhow!("Failed to validate date {value:?}: {e}"))
}

/// Parses a month, either `YYYY-MM` or any day inside it. Returns the first day of the month.
/// Defaults to the current month.
pub fn parse_month(value: Option<&str>, style: DateStyle, now: DateTime<Local>) -> Result<NaiveDate> {
    let Some(value) = value else {
        return Ok(now.beginning_of_month().date_naive());
    };
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d") {
        return Ok(date);
    }
    let day = parse_date_string(value, now, style.into())
        .map_err(|e| anyhow!("Failed to validate month {value:?}: {e}"))?;
    Ok(day.beginning_of_month().date_naive())
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate, TimeZone};

    use super::{parse_day, parse_month, DateStyle};

    fn now() -> chrono::DateTime<Local> {
        Local.with_ymd_and_hms(2024, 4, 17, 15, 0, 0).unwrap()
    }

    #[test]
    fn days_default_to_today() {
        assert_eq!(
            parse_day(None, DateStyle::Uk, now()).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 17).unwrap()
        );
    }

    #[test]
    fn days_parse_iso_and_dialects() {
        assert_eq!(
            parse_day(Some("2024-03-05"), DateStyle::Uk, now()).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert_eq!(
            parse_day(Some("05/03/2024"), DateStyle::Uk, now()).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert_eq!(
            parse_day(Some("05/03/2024"), DateStyle::Us, now()).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 3).unwrap()
        );
        assert!(parse_day(Some("not a date"), DateStyle::Uk, now()).is_err());
    }

    #[test]
    fn months_normalize_to_first_day() {
        assert_eq!(
            parse_month(None, DateStyle::Uk, now()).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
        );
        assert_eq!(
            parse_month(Some("2023-12"), DateStyle::Uk, now()).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 1).unwrap()
        );
        assert_eq!(
            parse_month(Some("15/02/2024"), DateStyle::Uk, now()).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
    }
}
