use std::{
    env, io,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};

const APP_NAME: &str = "clockbot";

/// Where state lives when no directory is passed on the command line. Follows the XDG base
/// directory layout, or `%APPDATA%` on Windows.
fn default_location(var: impl Fn(&str) -> Option<String>) -> Result<PathBuf> {
    let base = if cfg!(windows) {
        var("APPDATA")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("APPDATA should be present on Windows"))?
    } else {
        var("XDG_STATE_HOME")
            .map(PathBuf::from)
            .or_else(|| var("HOME").map(|home| Path::new(&home).join(".local/state")))
            .ok_or_else(|| anyhow!("Couldn't find neither XDG_STATE_HOME nor HOME"))?
    };
    Ok(base.join(APP_NAME))
}

/// Resolves the application directory that holds the logs and the default config file, and
/// makes sure it exists.
pub fn application_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let path = match explicit {
        Some(path) => path,
        None => default_location(|name| env::var(name).ok())?,
    };

    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v).with_context(|| format!("Failed to create application directory {path:?}")),
    }
}
