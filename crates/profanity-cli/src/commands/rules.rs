//! Rules command implementation.

use anyhow::Result;
use profanity_core::{Rule, Scanner};
use std::fmt::Write;
use std::path::Path;

use crate::config_resolver::ConfigSource;

/// Runs the rules command: prints the effective rules for `dir`.
pub fn run(
    dir: &Path,
    root: Option<&Path>,
    rules_file: Option<String>,
    source: &ConfigSource,
) -> Result<()> {
    let config = super::load_config(source)?;

    let mut builder = Scanner::builder().config(config);
    if let Some(root) = root {
        builder = builder.root(root);
    }
    if let Some(name) = rules_file {
        builder = builder.rules_file(name);
    }
    let scanner = builder.build()?;

    let rules = scanner.effective_rules(dir)?;
    print!("{}", render(dir, scanner.root(), &rules));
    Ok(())
}

fn render(dir: &Path, root: &Path, rules: &[Rule]) -> String {
    let mut out = String::new();
    if rules.is_empty() {
        let _ = writeln!(out, "No rules apply to {}", dir.display());
        return out;
    }

    let _ = writeln!(
        out,
        "Effective rules for {} ({}):\n",
        dir.display(),
        rules.len()
    );
    let _ = writeln!(out, "{:<4} {:<40} Origin", "#", "Rule");
    let _ = writeln!(out, "{}", "-".repeat(80));
    for (i, rule) in rules.iter().enumerate() {
        let origin = rule.origin().strip_prefix(root).unwrap_or(rule.origin());
        let description = rule.to_string();
        let _ = writeln!(out, "{:<4} {description:<40} {}", i + 1, origin.display());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use profanity_core::{Check, GlobFilter};

    #[test]
    fn render_lists_rules_in_order_with_relative_origin() {
        let rules = vec![
            Rule::new(Check::Contains("TODO".into())).with_origin("/repo/PROFANITY"),
            Rule::new(Check::NotContains("LICENSE".into()))
                .with_origin("/repo/src/PROFANITY")
                .with_include(GlobFilter::new("*.go")),
        ];

        let out = render(Path::new("src"), Path::new("/repo"), &rules);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "Effective rules for src (2):");
        assert!(lines[4].starts_with("1    contains: \"TODO\""));
        assert!(lines[4].ends_with(" PROFANITY"));
        assert!(lines[5].contains("include=[*.go]"));
        assert!(lines[5].ends_with(" src/PROFANITY"));
    }

    #[test]
    fn render_reports_empty_rule_set() {
        let out = render(Path::new("docs"), Path::new("/repo"), &[]);
        assert_eq!(out, "No rules apply to docs\n");
    }
}
