//! profanity CLI tool.
//!
//! Usage:
//! ```bash
//! profanity check [OPTIONS] [PATH]
//! profanity rules [DIR]
//! profanity init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use profanity_core::ScanError;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Exit status when a rule is violated.
const EXIT_VIOLATION: u8 = 1;
/// Exit status when the scan could not complete.
const EXIT_ERROR: u8 = 2;

/// Hierarchical content-policy linter driven by per-directory rules files
#[derive(Parser)]
#[command(name = "profanity")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory tree against its rules files
    Check {
        /// Path to scan (default: configured root, else current directory)
        path: Option<PathBuf>,

        /// Name of the per-directory rules file
        #[arg(long)]
        rules_file: Option<String>,

        /// Only scan files matching these globs (comma-separated, repeatable)
        #[arg(short, long)]
        include: Vec<String>,

        /// Never scan files matching these globs (comma-separated, repeatable)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Report every failing file instead of stopping at the first
        #[arg(long)]
        collect_all: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the effective rules for a directory, in evaluation order
    Rules {
        /// Directory to resolve, relative to the root
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Scan root the rules are inherited from
        #[arg(long)]
        root: Option<PathBuf>,

        /// Name of the per-directory rules file
        #[arg(long)]
        rules_file: Option<String>,
    },

    /// Create a starter rules file in the current directory
    Init {
        /// Overwrite an existing rules file
        #[arg(long)]
        force: bool,

        /// Name of the rules file to create (default: configured name)
        #[arg(long)]
        rules_file: Option<String>,
    },
}

/// Output format for scan results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            match err.downcast::<ScanError>() {
                Ok(scan_err) => eprintln!("{:?}", miette::Report::new(scan_err)),
                Err(other) => eprintln!("Error: {other:?}"),
            }
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Check {
            path,
            rules_file,
            include,
            exclude,
            collect_all,
            format,
        } => {
            let project_dir = path.clone().unwrap_or_else(|| PathBuf::from("."));
            let source = config_resolver::resolve(&project_dir, cli.config.as_deref());
            let args = commands::check::CheckArgs {
                path,
                rules_file,
                include,
                exclude,
                collect_all,
                format,
            };
            commands::check::run(&args, &source)
        }
        Commands::Rules {
            dir,
            root,
            rules_file,
        } => {
            let project_dir = root.as_deref().unwrap_or(Path::new("."));
            let source = config_resolver::resolve(project_dir, cli.config.as_deref());
            commands::rules::run(&dir, root.as_deref(), rules_file, &source)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { force, rules_file } => {
            let source = config_resolver::resolve(Path::new("."), cli.config.as_deref());
            commands::init::run(force, rules_file, &source)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
