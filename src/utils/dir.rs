use std::{env, io, path::PathBuf};

use anyhow::{anyhow, Result};

/// Resolves the directory holding stored namespaces and logs, creating it when missing.
/// Follows `$XDG_DATA_HOME` (falling back to `$HOME/.local/share`) on unix and `%APPDATA%` on
/// Windows.
pub fn create_application_default_path() -> Result<PathBuf> {
    let mut path = platform_data_home()?;
    path.push("worklog");
    ensure_dir(path)
}

pub fn ensure_dir(path: PathBuf) -> Result<PathBuf> {
    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}

fn platform_data_home() -> Result<PathBuf> {
    cfg_if::cfg_if! {
        if #[cfg(windows)] {
            env::var("APPDATA")
                .map(PathBuf::from)
                .map_err(|_| anyhow!("APPDATA should be present on Windows"))
        } else {
            env::var("XDG_DATA_HOME")
                .map(PathBuf::from)
                .or_else(|_| {
                    env::var("HOME").map(|home| {
                        let mut path = PathBuf::from(home);
                        path.push(".local/share");
                        path
                    })
                })
                .map_err(|_| anyhow!("Couldn't find neither XDG_DATA_HOME nor HOME"))
        }
    }
}
