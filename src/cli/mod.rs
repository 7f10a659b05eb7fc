pub mod backup;
pub mod dates;
pub mod output;
pub mod report;
pub mod settings;

use std::{io::Write, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use backup::{
    process_backup_command, process_clear_command, process_restore_command, BackupCommand,
    ClearCommand, RestoreCommand,
};
use chrono::{DateTime, Local, Locale};
use clap::{Parser, Subcommand};
use dates::DateStyle;
use output::OutputStyle;
use report::{
    process_add_command, process_delete_command, process_edit_command, process_list_command,
    process_summary_command, AddCommand, DeleteCommand, EditCommand, ListCommand, SummaryCommand,
};
use settings::{
    process_goal_command, process_info_command, process_work_days_command, GoalCommand,
    InfoCommand, WorkDaysCommand,
};
use tracing::level_filters::LevelFilter;

use crate::{
    context::AppContext,
    storage::key_value::KeyValueStore,
    utils::{
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Worklog", version, long_about = None)]
#[command(about = "Track daily work reports against a monthly goal", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        env = "WORKLOG_DIR",
        help = "Application directory. By default uses $XDG_DATA_HOME/worklog or $HOME/.local/share/worklog"
    )]
    dir: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "WORKLOG_LOCALE",
        default_value = "en_US",
        value_parser = parse_locale,
        help = "Locale used for month names, for example en_US or pt_BR"
    )]
    locale: Locale,
    #[arg(long, global = true, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, global = true, help = "Mirror logs to stdout")]
    log: bool,
    #[arg(long, global = true, help = "Log level, overrides RUST_LOG")]
    log_filter: Option<LevelFilter>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Add a report")]
    Add {
        #[command(flatten)]
        command: AddCommand,
    },
    #[command(about = "List the reports of a month, newest first")]
    List {
        #[command(flatten)]
        command: ListCommand,
    },
    #[command(about = "Change fields of an existing report")]
    Edit {
        #[command(flatten)]
        command: EditCommand,
    },
    #[command(about = "Delete a report")]
    Delete {
        #[command(flatten)]
        command: DeleteCommand,
    },
    #[command(about = "Show monthly totals and progress towards the goal")]
    Summary {
        #[command(flatten)]
        command: SummaryCommand,
    },
    #[command(about = "Show or set the monthly goal")]
    Goal {
        #[command(flatten)]
        command: GoalCommand,
    },
    #[command(about = "Show or set personal info")]
    Info {
        #[command(flatten)]
        command: InfoCommand,
    },
    #[command(about = "Show or set the days of the week you work")]
    WorkDays {
        #[command(flatten)]
        command: WorkDaysCommand,
    },
    #[command(about = "Export every stored namespace into a backup document")]
    Backup {
        #[command(flatten)]
        command: BackupCommand,
    },
    #[command(about = "Replace stored data with a backup document")]
    Restore {
        #[command(flatten)]
        command: RestoreCommand,
    },
    #[command(about = "Remove stored namespaces")]
    Clear {
        #[command(flatten)]
        command: ClearCommand,
    },
}

fn parse_locale(value: &str) -> Result<Locale> {
    Locale::try_from(value).map_err(|_| anyhow!("Unknown locale {value}"))
}

/// Per invocation settings shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct Session {
    pub now: DateTime<Local>,
    pub date_style: DateStyle,
    pub output: OutputStyle,
}

impl Session {
    pub fn today(&self) -> chrono::NaiveDate {
        self.now.date_naive()
    }
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = match args.dir {
        Some(dir) => ensure_dir(dir)?,
        None => create_application_default_path()?,
    };

    let logging_level = match (args.log_filter, args.log) {
        (Some(level), _) => Some(level),
        (None, true) => Some(LevelFilter::TRACE),
        (None, false) => None,
    };
    enable_logging(CLI_PREFIX, &dir, logging_level, args.log)?;

    let context = AppContext::open(dir.join("store"))
        .with_context(|| format!("Failed to open store in {dir:?}"))?;
    let session = Session {
        now: Local::now(),
        date_style: args.date_style,
        output: OutputStyle::for_stdout(args.locale),
    };

    let mut out = std::io::stdout().lock();
    dispatch(args.commands, &context, &session, &mut out).await?;
    out.flush()?;
    Ok(())
}

async fn dispatch<S: KeyValueStore>(
    commands: Commands,
    context: &AppContext<S>,
    session: &Session,
    out: &mut impl Write,
) -> Result<()> {
    match commands {
        Commands::Add { command } => process_add_command(command, context, session, out).await,
        Commands::List { command } => process_list_command(command, context, session, out).await,
        Commands::Edit { command } => process_edit_command(command, context, session, out).await,
        Commands::Delete { command } => process_delete_command(command, context, out).await,
        Commands::Summary { command } => {
            process_summary_command(command, context, session, out).await
        }
        Commands::Goal { command } => process_goal_command(command, context, out).await,
        Commands::Info { command } => process_info_command(command, context, out).await,
        Commands::WorkDays { command } => {
            process_work_days_command(command, context, session, out).await
        }
        Commands::Backup { command } => {
            process_backup_command(command, context, session, out).await
        }
        Commands::Restore { command } => process_restore_command(command, context, out).await,
        Commands::Clear { command } => process_clear_command(command, context, out).await,
    }
}

#[cfg(test)]
pub(crate) mod test_session {
    use chrono::{Local, Locale, TimeZone};

    use super::{dates::DateStyle, output::OutputStyle, Session};

    /// Wednesday 17 April 2024, 15:00 local time, plain output.
    pub fn session() -> Session {
        Session {
            now: Local.with_ymd_and_hms(2024, 4, 17, 15, 0, 0).unwrap(),
            date_style: DateStyle::Uk,
            output: OutputStyle {
                locale: Locale::en_US,
                colored: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use chrono::Locale;
    use clap::Parser;

    use crate::{context::AppContext, storage::key_value::MemoryKeyValueStore};

    use super::{dispatch, test_session::session, Args};

    async fn run(context: &AppContext<Arc<MemoryKeyValueStore>>, args: &[&str]) -> Result<String> {
        let args = Args::try_parse_from(std::iter::once("worklog").chain(args.iter().copied()))?;
        let mut out = vec![];
        dispatch(args.commands, context, &session(), &mut out).await?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn global_flags_parse() -> Result<()> {
        let args = Args::try_parse_from([
            "worklog",
            "list",
            "--locale",
            "pt_BR",
            "--date-style",
            "us",
            "--log-filter",
            "debug",
        ])?;
        assert_eq!(args.locale, Locale::pt_BR);
        assert!(Args::try_parse_from(["worklog", "list", "--locale", "xx_YY"]).is_err());
        Ok(())
    }

    #[tokio::test]
    async fn add_then_summarize() -> Result<()> {
        let context = AppContext::new(Arc::new(MemoryKeyValueStore::new()));
        run(&context, &["goal", "--hours", "10"]).await?;
        run(&context, &["work-days", "--set", "mon,wed,fri"]).await?;
        run(&context, &["add", "--date", "2024-04-15", "--duration", "1:30"]).await?;
        run(&context, &["add", "--duration", "45", "--studies", "2"]).await?;

        let summary = run(&context, &["summary"]).await?;
        assert!(summary.contains("Reports:\t2\n"));
        assert!(summary.contains("Hours:\t\t02:15\n"));
        // 17, 19, 22, 24, 26, 29 remain.
        assert!(summary.contains("Working days:\t6 left of 13\n"));
        Ok(())
    }
}
