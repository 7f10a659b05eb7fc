use chrono::NaiveDate;

use crate::{
    storage::entities::{Goals, WorkDays},
    utils::{
        percentage::{minutes_percentage, Percentage},
        time::{remaining_working_days, working_days_in_month},
    },
};

use super::monthly::MonthlySummary;

/// How a month stands against the monthly goal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalProgress {
    pub goal_minutes: u32,
    pub worked_minutes: u32,
    /// Never negative, going over the goal leaves nothing remaining.
    pub remaining_minutes: u32,
    pub working_days_in_month: u32,
    /// Working days still available in the month as of `today`.
    pub remaining_working_days: u32,
    /// Minutes per remaining working day needed to hit the goal, rounded up.
    pub daily_target_minutes: u32,
    /// `None` when no goal is set.
    pub completion: Option<Percentage>,
}

pub fn goal_progress(
    goals: &Goals,
    summary: &MonthlySummary,
    work_days: &WorkDays,
    today: NaiveDate,
) -> GoalProgress {
    let goal_minutes = goals.monthly_hours;
    let worked_minutes = summary.total_minutes;
    let remaining_minutes = goal_minutes.saturating_sub(worked_minutes);

    let remaining_days = if today > summary.month_end {
        0
    } else if today < summary.month_start {
        working_days_in_month(summary.month_start, work_days)
    } else {
        remaining_working_days(today, work_days)
    };

    let daily_target_minutes = if remaining_days == 0 {
        0
    } else {
        remaining_minutes.div_ceil(remaining_days)
    };

    GoalProgress {
        goal_minutes,
        worked_minutes,
        remaining_minutes,
        working_days_in_month: working_days_in_month(summary.month_start, work_days),
        remaining_working_days: remaining_days,
        daily_target_minutes,
        completion: minutes_percentage(worked_minutes, goal_minutes),
    }
}
