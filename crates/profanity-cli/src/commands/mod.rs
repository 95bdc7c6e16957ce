//! Subcommand implementations.

pub mod check;
pub mod init;
pub mod output;
pub mod rules;

use anyhow::{Context, Result};
use profanity_core::Config;

use crate::config_resolver::ConfigSource;

/// Loads the resolved configuration, or defaults when none was found.
fn load_config(source: &ConfigSource) -> Result<Config> {
    match source {
        ConfigSource::Default => Ok(Config::default()),
        other => {
            // Invariant: non-Default variants always have a path
            let p = other.path().context("resolved config has no path")?;
            if source.is_global() {
                tracing::info!("Using global config: {}", p.display());
            }
            Config::from_file(p).with_context(|| format!("Failed to load config: {}", p.display()))
        }
    }
}
