//! CLI module graph and shared helpers.

use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::infrastructure::config::Config;

pub mod check;
pub mod command;
pub mod recover;
pub mod run;

/// Tunables file picked up from the working directory when no `--config`
/// is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Load configuration for a CLI invocation.
///
/// An explicit path must exist. Without one, `config.toml` in the working
/// directory is used when present, otherwise the environment alone.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the configuration is
/// invalid.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading configuration file");
            Config::load(path)
        }
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => Config::load(DEFAULT_CONFIG_FILE),
        None => Config::from_env(),
    }
}

pub(crate) fn field(label: &str, value: impl std::fmt::Display) {
    println!("  {label:<22} {value}");
}
