use std::io::Write;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use crate::{
    analysis::{
        goal::goal_progress,
        monthly::{reports_in_month, summarize_month},
    },
    context::AppContext,
    storage::{
        entities::{Report, ReportPatch},
        key_value::KeyValueStore,
    },
    utils::{ids::RecordId, time::parse_duration},
};

use super::{
    dates::{parse_day, parse_month},
    output::{write_month_reports, write_report, write_summary},
    Session,
};

const DAY_HELP: &str =
    "Day of the report. Examples are \"yesterday\", \"friday\", \"15/03/2025\", \"2025-03-15\"";
const MONTH_HELP: &str =
    "Month to show. Either \"2025-03\" or any day inside it like \"last month\" or \"15/03/2025\"";

fn duration_arg(value: &str) -> Result<u32> {
    parse_duration(value)
}

#[derive(Debug, Parser)]
pub struct AddCommand {
    #[arg(long, short, help = DAY_HELP)]
    date: Option<String>,
    #[arg(long, short = 't', value_parser = duration_arg, help = "Time worked, either minutes or hours:minutes")]
    duration: u32,
    #[arg(long, short, default_value_t = 0, help = "Number of study sessions")]
    studies: u32,
    #[arg(long, short, default_value = "", help = "Free form notes")]
    notes: String,
}

pub async fn process_add_command<S: KeyValueStore>(
    command: AddCommand,
    context: &AppContext<S>,
    session: &Session,
    out: &mut impl Write,
) -> Result<()> {
    let date = parse_day(command.date.as_deref(), session.date_style, session.now)?;
    let record = context
        .reports
        .create(Report {
            date,
            duration: command.duration,
            study_hours: command.studies,
            observations: command.notes.trim().to_string(),
        })
        .await
        .context("Failed to save the report, try again")?;
    info!("Added report {}", record.id);
    write_report(out, &session.output, &record)?;
    Ok(())
}

#[derive(Debug, Parser)]
pub struct ListCommand {
    #[arg(long, short, help = MONTH_HELP)]
    month: Option<String>,
}

pub async fn process_list_command<S: KeyValueStore>(
    command: ListCommand,
    context: &AppContext<S>,
    session: &Session,
    out: &mut impl Write,
) -> Result<()> {
    let month = parse_month(command.month.as_deref(), session.date_style, session.now)?;
    let records = context.reports.list_all().await;
    let summary = summarize_month(&records, month);
    let reports = reports_in_month(&records, month);
    write_month_reports(out, &session.output, &summary, &reports)?;
    Ok(())
}

#[derive(Debug, Parser)]
pub struct EditCommand {
    #[arg(help = "Id of the report, as shown by list")]
    id: String,
    #[arg(long, short, help = DAY_HELP)]
    date: Option<String>,
    #[arg(long, short = 't', value_parser = duration_arg, help = "Time worked, either minutes or hours:minutes")]
    duration: Option<u32>,
    #[arg(long, short, help = "Number of study sessions")]
    studies: Option<u32>,
    #[arg(long, short, help = "Free form notes")]
    notes: Option<String>,
}

pub async fn process_edit_command<S: KeyValueStore>(
    command: EditCommand,
    context: &AppContext<S>,
    session: &Session,
    out: &mut impl Write,
) -> Result<()> {
    let date = match command.date.as_deref() {
        Some(value) => Some(parse_day(Some(value), session.date_style, session.now)?),
        None => None,
    };
    let patch = ReportPatch {
        date,
        duration: command.duration,
        study_hours: command.studies,
        observations: command.notes.map(|v| v.trim().to_string()),
    };
    if patch.is_empty() {
        bail!("Nothing to change. Pass at least one of --date, --duration, --studies or --notes");
    }

    let id = RecordId::new(command.id);
    let record = context
        .reports
        .update(&id, &patch)
        .await
        .with_context(|| format!("Failed to update report {id}"))?;
    info!("Updated report {id}");
    write_report(out, &session.output, &record)?;
    Ok(())
}

#[derive(Debug, Parser)]
pub struct DeleteCommand {
    #[arg(help = "Id of the report, as shown by list")]
    id: String,
}

pub async fn process_delete_command<S: KeyValueStore>(
    command: DeleteCommand,
    context: &AppContext<S>,
    out: &mut impl Write,
) -> Result<()> {
    let id = RecordId::new(command.id);
    if context.reports.get(&id).await.is_none() {
        bail!("No report with id {id}");
    }
    context
        .reports
        .delete(&id)
        .await
        .with_context(|| format!("Failed to delete report {id}, try again"))?;
    info!("Deleted report {id}");
    writeln!(out, "Deleted report {id}")?;
    Ok(())
}

#[derive(Debug, Parser)]
pub struct SummaryCommand {
    #[arg(long, short, help = MONTH_HELP)]
    month: Option<String>,
}

pub async fn process_summary_command<S: KeyValueStore>(
    command: SummaryCommand,
    context: &AppContext<S>,
    session: &Session,
    out: &mut impl Write,
) -> Result<()> {
    let month = parse_month(command.month.as_deref(), session.date_style, session.now)?;
    let records = context.reports.list_all().await;
    let summary = summarize_month(&records, month);
    let goals = context.goals.load().await;
    let work_days = context.work_days.load().await;
    let progress = goal_progress(&goals, &summary, &work_days, session.today());
    write_summary(out, &session.output, &summary, &progress)?;
    Ok(())
}
