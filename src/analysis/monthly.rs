use chrono::NaiveDate;

use crate::{
    storage::entities::{Record, Report},
    utils::time::{is_in_range, month_range},
};

/// Totals of one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlySummary {
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub reports: usize,
    /// Sum of report durations, in minutes.
    pub total_minutes: u32,
    /// Sum of study sessions.
    pub total_studies: u32,
}

/// Reports dated inside `month`'s calendar month, most recent first. Reports sharing a date keep
/// the order they were stored in.
pub fn reports_in_month(records: &[Record<Report>], month: NaiveDate) -> Vec<&Record<Report>> {
    let (start, end) = month_range(month);
    let mut selected = records
        .iter()
        .filter(|v| is_in_range(v.payload.date, start, end))
        .collect::<Vec<_>>();
    // sort_by is stable
    selected.sort_by(|a, b| b.payload.date.cmp(&a.payload.date));
    selected
}

pub fn summarize_month(records: &[Record<Report>], month: NaiveDate) -> MonthlySummary {
    let (month_start, month_end) = month_range(month);
    records
        .iter()
        .filter(|v| is_in_range(v.payload.date, month_start, month_end))
        .fold(
            MonthlySummary {
                month_start,
                month_end,
                reports: 0,
                total_minutes: 0,
                total_studies: 0,
            },
            |mut summary, record| {
                summary.reports += 1;
                summary.total_minutes = summary.total_minutes.saturating_add(record.payload.duration);
                summary.total_studies =
                    summary.total_studies.saturating_add(record.payload.study_hours);
                summary
            },
        )
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::{
        storage::entities::{Record, Report},
        utils::ids::RecordId,
    };

    use super::{reports_in_month, summarize_month};

    fn record(id: &str, date: (i32, u32, u32), duration: u32, studies: u32) -> Record<Report> {
        let created_at = Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap();
        Record {
            id: RecordId::new(id),
            created_at,
            updated_at: created_at,
            payload: Report {
                date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
                duration,
                study_hours: studies,
                observations: String::new(),
            },
        }
    }

    #[test]
    fn summary_excludes_other_months() {
        let records = vec![
            record("a", (2024, 4, 2), 60, 1),
            record("b", (2024, 4, 15), 30, 0),
            record("c", (2024, 3, 31), 500, 7),
            record("d", (2024, 4, 30), 45, 2),
        ];
        let summary = summarize_month(&records, NaiveDate::from_ymd_opt(2024, 4, 20).unwrap());
        assert_eq!(summary.reports, 3);
        assert_eq!(summary.total_minutes, 135);
        assert_eq!(summary.total_studies, 3);
        assert_eq!(summary.month_start, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(summary.month_end, NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
    }

    #[test]
    fn empty_month_sums_to_zero() {
        let records = vec![record("a", (2024, 5, 2), 60, 1)];
        let summary = summarize_month(&records, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(summary.reports, 0);
        assert_eq!(summary.total_minutes, 0);
    }

    #[test]
    fn month_listing_is_newest_first_and_stable() {
        let records = vec![
            record("a", (2024, 4, 2), 60, 1),
            record("b", (2024, 4, 9), 30, 0),
            record("c", (2024, 4, 2), 10, 0),
            record("d", (2024, 5, 1), 10, 0),
            record("e", (2024, 4, 9), 20, 0),
        ];
        let ids = reports_in_month(&records, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap())
            .into_iter()
            .map(|v| v.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["b", "e", "a", "c"]);
    }
}
