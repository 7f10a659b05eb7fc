use std::io::Write;

use anyhow::{Context, Result};
use chrono::Weekday;
use clap::Parser;
use tracing::info;

use crate::{
    context::AppContext,
    storage::{
        entities::{Goals, PersonalInfo, WorkDays},
        key_value::KeyValueStore,
    },
    utils::time::working_days_in_month,
};

use super::{
    output::{write_goal, write_personal_info, write_work_days},
    Session,
};

#[derive(Debug, Parser)]
pub struct GoalCommand {
    #[arg(long, help = "Whole hours of the monthly goal")]
    hours: Option<u32>,
    #[arg(long, value_parser = clap::value_parser!(u32).range(..60), help = "Extra minutes of the monthly goal")]
    minutes: Option<u32>,
}

/// Shows the goal, or replaces it when either part is given. A missing part counts as zero.
pub async fn process_goal_command<S: KeyValueStore>(
    command: GoalCommand,
    context: &AppContext<S>,
    out: &mut impl Write,
) -> Result<()> {
    let goals = match (command.hours, command.minutes) {
        (None, None) => context.goals.load().await,
        (hours, minutes) => {
            let goals = Goals::from_hours_and_minutes(hours.unwrap_or(0), minutes.unwrap_or(0));
            context
                .goals
                .save(&goals)
                .await
                .context("Failed to save the goal, try again")?;
            info!("Monthly goal set to {} minutes", goals.monthly_hours);
            goals
        }
    };
    write_goal(out, &goals)?;
    Ok(())
}

#[derive(Debug, Parser)]
pub struct InfoCommand {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
}

pub async fn process_info_command<S: KeyValueStore>(
    command: InfoCommand,
    context: &AppContext<S>,
    out: &mut impl Write,
) -> Result<()> {
    let current = context.personal_info.load().await;
    let info = if command.name.is_none() && command.email.is_none() {
        current
    } else {
        let info = PersonalInfo::new(
            command.name.as_deref().unwrap_or(&current.name),
            command.email.as_deref().unwrap_or(&current.email),
        );
        context
            .personal_info
            .save(&info)
            .await
            .context("Failed to save personal info, try again")?;
        info!("Personal info updated");
        info
    };
    write_personal_info(out, &info)?;
    Ok(())
}

#[derive(Debug, Parser)]
pub struct WorkDaysCommand {
    #[arg(
        long,
        value_delimiter = ',',
        conflicts_with = "none",
        help = "Days you work, for example \"mon,tue,wed,thu,fri\""
    )]
    set: Option<Vec<Weekday>>,
    #[arg(long, help = "Clear the selection")]
    none: bool,
}

pub async fn process_work_days_command<S: KeyValueStore>(
    command: WorkDaysCommand,
    context: &AppContext<S>,
    session: &Session,
    out: &mut impl Write,
) -> Result<()> {
    let work_days = match (command.set, command.none) {
        (Some(days), _) => Some(WorkDays::from_weekdays(days)),
        (None, true) => Some(WorkDays::default()),
        (None, false) => None,
    };
    let work_days = match work_days {
        Some(work_days) => {
            context
                .work_days
                .save(&work_days)
                .await
                .context("Failed to save work days, try again")?;
            info!("Work days set to {work_days}");
            work_days
        }
        None => context.work_days.load().await,
    };
    let this_month = working_days_in_month(session.today(), &work_days);
    write_work_days(out, &work_days, this_month)?;
    Ok(())
}
