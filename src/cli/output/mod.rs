//! Plain text rendering of reports and settings. Everything writes into a [Write] so the layout
//! can be checked without a terminal.

use std::io::{self, IsTerminal, Write};

use ansi_term::{Colour, Style};
use chrono::Locale;

use crate::{
    analysis::{goal::GoalProgress, monthly::MonthlySummary},
    storage::entities::{Goals, PersonalInfo, Record, Report, WorkDays},
    utils::time::{format_duration, format_month_label},
};

/// How output should look.
#[derive(Debug, Clone, Copy)]
pub struct OutputStyle {
    pub locale: Locale,
    pub colored: bool,
}

impl OutputStyle {
    /// Colors only when stdout is a terminal.
    pub fn for_stdout(locale: Locale) -> Self {
        Self {
            locale,
            colored: io::stdout().is_terminal(),
        }
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.colored {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        self.paint(Colour::Cyan.bold(), text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(Style::new().dimmed(), text)
    }
}

fn studies_label(count: u32) -> String {
    if count == 1 {
        "1 study session".into()
    } else {
        format!("{count} study sessions")
    }
}

pub fn write_report(out: &mut impl Write, style: &OutputStyle, record: &Record<Report>) -> io::Result<()> {
    let report = &record.payload;
    writeln!(
        out,
        "{} {}\t{}\t{}\t{}",
        report.date.format("%a"),
        report.date.format("%d/%m"),
        format_duration(report.duration),
        studies_label(report.study_hours),
        style.dim(record.id.as_str()),
    )?;
    if !report.observations.is_empty() {
        writeln!(out, "\t{}", report.observations)?;
    }
    Ok(())
}

pub fn write_month_reports(
    out: &mut impl Write,
    style: &OutputStyle,
    summary: &MonthlySummary,
    reports: &[&Record<Report>],
) -> io::Result<()> {
    writeln!(
        out,
        "{}",
        style.heading(&format_month_label(summary.month_start, style.locale))
    )?;
    if reports.is_empty() {
        writeln!(out, "No reports for this month")?;
        return Ok(());
    }
    for record in reports {
        write_report(out, style, record)?;
    }
    writeln!(
        out,
        "Total\t{}\t{}",
        format_duration(summary.total_minutes),
        studies_label(summary.total_studies)
    )
}

pub fn write_summary(
    out: &mut impl Write,
    style: &OutputStyle,
    summary: &MonthlySummary,
    progress: &GoalProgress,
) -> io::Result<()> {
    writeln!(
        out,
        "{}",
        style.heading(&format_month_label(summary.month_start, style.locale))
    )?;
    writeln!(out, "Reports:\t{}", summary.reports)?;
    writeln!(out, "Hours:\t\t{}", format_duration(summary.total_minutes))?;
    writeln!(out, "Studies:\t{}", summary.total_studies)?;

    writeln!(out, "{}", style.heading("Goal"))?;
    if progress.goal_minutes == 0 {
        writeln!(out, "No monthly goal set")?;
    } else {
        let completion = progress
            .completion
            .map(|v| v.to_string())
            .unwrap_or_default();
        writeln!(
            out,
            "Total goal:\t{} ({completion})",
            format_duration(progress.goal_minutes)
        )?;
        let remaining = format_duration(progress.remaining_minutes);
        let remaining = if progress.remaining_minutes == 0 {
            style.paint(Colour::Green.bold(), &remaining)
        } else {
            remaining
        };
        writeln!(out, "Remaining:\t{remaining}")?;
        writeln!(
            out,
            "Daily goal:\t{}",
            format_duration(progress.daily_target_minutes)
        )?;
    }
    writeln!(
        out,
        "Working days:\t{} left of {}",
        progress.remaining_working_days, progress.working_days_in_month
    )
}

pub fn write_goal(out: &mut impl Write, goals: &Goals) -> io::Result<()> {
    writeln!(out, "Monthly goal:\t{} hours", goals.formatted())
}

pub fn write_personal_info(out: &mut impl Write, info: &PersonalInfo) -> io::Result<()> {
    writeln!(out, "Name:\t{}", info.name)?;
    writeln!(out, "Email:\t{}", info.email)
}

pub fn write_work_days(out: &mut impl Write, work_days: &WorkDays, this_month: u32) -> io::Result<()> {
    if work_days.is_empty() {
        return writeln!(out, "No work days selected");
    }
    writeln!(out, "Work days:\t{work_days}")?;
    writeln!(out, "This month:\t{this_month} working days")
}

#[cfg(test)]
mod tests {
    use chrono::{Locale, NaiveDate, TimeZone, Utc, Weekday};

    use crate::{
        analysis::{goal::goal_progress, monthly::{reports_in_month, summarize_month}},
        storage::entities::{Goals, Record, Report, WorkDays},
        utils::ids::RecordId,
    };

    use super::*;

    fn plain() -> OutputStyle {
        OutputStyle {
            locale: Locale::en_US,
            colored: false,
        }
    }

    fn records() -> Vec<Record<Report>> {
        let created_at = Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap();
        [(1, 90, 1, ""), (3, 45, 2, "Call with team")]
            .into_iter()
            .map(|(day, duration, studies, notes)| Record {
                id: RecordId::new(format!("r{day}")),
                created_at,
                updated_at: created_at,
                payload: Report {
                    date: NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
                    duration,
                    study_hours: studies,
                    observations: notes.into(),
                },
            })
            .collect()
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = vec![];
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn month_listing() {
        let records = records();
        let month = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let summary = summarize_month(&records, month);
        let reports = reports_in_month(&records, month);
        let text = render(|out| write_month_reports(out, &plain(), &summary, &reports));

        assert_eq!(
            text,
            "April 2024\n\
             Wed 03/04\t00:45\t2 study sessions\tr3\n\
             \tCall with team\n\
             Mon 01/04\t01:30\t1 study session\tr1\n\
             Total\t02:15\t3 study sessions\n"
        );
    }

    #[test]
    fn empty_month_listing() {
        let month = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let summary = summarize_month(&[], month);
        let text = render(|out| write_month_reports(out, &plain(), &summary, &[]));
        assert_eq!(text, "May 2024\nNo reports for this month\n");
    }

    #[test]
    fn summary_with_goal() {
        let records = records();
        let month = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let summary = summarize_month(&records, month);
        let progress = goal_progress(
            &Goals::from_hours_and_minutes(9, 0),
            &summary,
            &WorkDays::from_weekdays([Weekday::Mon, Weekday::Wed, Weekday::Fri]),
            NaiveDate::from_ymd_opt(2024, 4, 22).unwrap(),
        );
        let text = render(|out| write_summary(out, &plain(), &summary, &progress));
        assert!(text.starts_with("April 2024\nReports:\t2\nHours:\t\t02:15\nStudies:\t3\n"));
        assert!(text.contains("Total goal:\t09:00 (25%)\n"));
        assert!(text.contains("Remaining:\t06:45\n"));
        // 405 minutes over 4 days
        assert!(text.contains("Daily goal:\t01:42\n"));
        assert!(text.ends_with("Working days:\t4 left of 13\n"));
    }

    #[test]
    fn settings_rendering() {
        assert_eq!(
            render(|out| write_goal(out, &Goals::from_hours_and_minutes(15, 0))),
            "Monthly goal:\t15:00 hours\n"
        );
        assert_eq!(
            render(|out| write_work_days(out, &WorkDays::default(), 0)),
            "No work days selected\n"
        );
        assert_eq!(
            render(|out| write_work_days(
                out,
                &WorkDays::from_weekdays([Weekday::Tue, Weekday::Thu]),
                9
            )),
            "Work days:\tTue, Thu\nThis month:\t9 working days\n"
        );
    }
}
