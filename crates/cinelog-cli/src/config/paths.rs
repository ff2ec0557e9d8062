//! Config file location.

use std::path::PathBuf;

use anyhow::{Context, Result};
use cinelog_db::UserDir;

/// Config file name inside the config directory.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolves the config file path.
///
/// `--dir` holds both config and data when given. Otherwise the file lives
/// in [`UserDir::Config`].
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined (when `dir` is `None`).
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    let config_dir = match dir {
        Some(d) => d.clone(),
        None => UserDir::Config
            .resolve()
            .context("failed to locate config directory")?,
    };
    Ok(config_dir.join(CONFIG_FILE_NAME))
}
