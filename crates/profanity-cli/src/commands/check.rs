//! Check command implementation.

use anyhow::Result;
use profanity_core::{FailPolicy, Scanner};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config_resolver::ConfigSource;
use crate::{OutputFormat, EXIT_VIOLATION};

/// Command-line options for `profanity check`.
#[derive(Debug)]
pub struct CheckArgs {
    /// Root to scan; falls back to the configured root.
    pub path: Option<PathBuf>,
    /// Rules file name override.
    pub rules_file: Option<String>,
    /// Global include globs.
    pub include: Vec<String>,
    /// Global exclude globs.
    pub exclude: Vec<String>,
    /// Report every failing file.
    pub collect_all: bool,
    /// Output format.
    pub format: OutputFormat,
}

/// Runs the check command.
pub fn run(args: &CheckArgs, source: &ConfigSource) -> Result<ExitCode> {
    let config = super::load_config(source)?;

    let mut builder = Scanner::builder().config(config);
    if let Some(path) = &args.path {
        builder = builder.root(path);
    }
    if let Some(name) = &args.rules_file {
        builder = builder.rules_file(name);
    }
    for pattern in &args.include {
        builder = builder.include(pattern);
    }
    builder = builder.excludes(&args.exclude);
    if args.collect_all {
        builder = builder.policy(FailPolicy::CollectAll);
    }

    let scanner = builder.build()?;

    tracing::info!(
        "Scanning {} for {} files",
        scanner.root().display(),
        scanner.rules_file()
    );

    let result = scanner.scan()?;

    super::output::print(&result, args.format)?;

    match result.first_violation() {
        None => Ok(ExitCode::SUCCESS),
        Some(first) => {
            tracing::debug!("First violation in {}", first.file.display());
            Ok(ExitCode::from(EXIT_VIOLATION))
        }
    }
}
