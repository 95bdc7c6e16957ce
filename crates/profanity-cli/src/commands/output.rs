//! Shared output formatting for scan results.

use anyhow::Result;
use profanity_core::{ScanResult, ViolationDiagnostic};

use crate::OutputFormat;

/// Print scan results in the specified format.
pub fn print(result: &ScanResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
    }
    Ok(())
}

fn print_text(result: &ScanResult) {
    for violation in &result.violations {
        let report = miette::Report::new(ViolationDiagnostic::from(violation));
        println!("{report:?}");
    }

    let summary_color = if result.passed() {
        "\x1b[32m"
    } else {
        "\x1b[31m"
    };

    println!("{}{}\x1b[0m", summary_color, result.summary());
}

fn print_json(result: &ScanResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &ScanResult) {
    for violation in &result.violations {
        println!("{violation}");
    }
}
