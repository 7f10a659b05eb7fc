use std::{io::Write, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use crate::{
    backup::validate_backup,
    context::AppContext,
    storage::{error::StorageError, key_value::KeyValueStore, namespace::Namespace},
};

use super::Session;

#[derive(Debug, Parser)]
pub struct BackupCommand {
    #[arg(
        long,
        short,
        help = "File or directory to write the backup to. Prints to stdout when missing"
    )]
    output: Option<PathBuf>,
}

pub async fn process_backup_command<S: KeyValueStore>(
    command: BackupCommand,
    context: &AppContext<S>,
    session: &Session,
    out: &mut impl Write,
) -> Result<()> {
    let content = context
        .backup
        .create_backup()
        .await
        .context("Failed to read stored data for the backup")?;

    let Some(mut path) = command.output else {
        writeln!(out, "{content}")?;
        return Ok(());
    };
    if path.is_dir() {
        path.push(format!("worklog-backup-{}.json", session.now.format("%Y-%m-%d")));
    }
    tokio::fs::write(&path, content)
        .await
        .with_context(|| format!("Failed to write backup to {path:?}"))?;
    info!("Backup written to {path:?}");
    writeln!(out, "Backup written to {}", path.display())?;
    Ok(())
}

#[derive(Debug, Parser)]
pub struct RestoreCommand {
    #[arg(help = "Backup file created by the backup command")]
    path: PathBuf,
}

pub async fn process_restore_command<S: KeyValueStore>(
    command: RestoreCommand,
    context: &AppContext<S>,
    out: &mut impl Write,
) -> Result<()> {
    let path = command.path;
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {path:?}"))?;
    if !validate_backup(&content) {
        bail!("{} is not a valid backup, nothing was changed", path.display());
    }

    match context.backup.restore_backup(&content).await {
        Ok(()) => {}
        Err(e @ StorageError::PartialRestoreFailure { .. }) => {
            warn!("Restore stopped halfway: {e}");
            return Err(e).context("Restore did not finish and some data is missing. Run restore again with the same file");
        }
        Err(e) => return Err(e).context("Failed to restore backup"),
    }
    writeln!(out, "Restored backup from {}", path.display())?;
    Ok(())
}

#[derive(Debug, Parser)]
pub struct ClearCommand {
    #[arg(required_unless_present = "all", help = "Namespaces to remove")]
    namespaces: Vec<Namespace>,
    #[arg(long, conflicts_with = "namespaces", help = "Remove every namespace")]
    all: bool,
}

pub async fn process_clear_command<S: KeyValueStore>(
    command: ClearCommand,
    context: &AppContext<S>,
    out: &mut impl Write,
) -> Result<()> {
    let namespaces = if command.all {
        Namespace::ALL.to_vec()
    } else {
        command.namespaces
    };
    context
        .clear(&namespaces)
        .await
        .context("Failed to clear data, try again")?;
    let names = namespaces
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>();
    info!("Cleared {names:?}");
    writeln!(out, "Cleared {}", names.join(", "))?;
    Ok(())
}
