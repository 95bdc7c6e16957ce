//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigSource;

const STARTER_RULES: &str = r#"# profanity rules
#
# Rules in this file apply to this directory and every directory below it.
# Each rule sets one check: contains, notContains or regex.
# include / exclude take comma-separated globs matched against the file
# path or its base name.

- message: "Resolve TODO markers before merging"
  contains: "TODO"
  exclude: "*.md"

# - message: "Go sources need a license header"
#   notContains: "Licensed under"
#   include: "*.go"

# - message: "No hard-coded passwords"
#   regex: "password\\s*=\\s*\"[^\"]+\""
"#;

/// Runs the init command.
///
/// The file name comes from `--rules-file`, else from the resolved config.
pub fn run(force: bool, rules_file: Option<String>, source: &ConfigSource) -> Result<()> {
    let name = match rules_file {
        Some(name) => name,
        None => super::load_config(source)?.scan.rules_file,
    };
    let path = run_in(Path::new("."), &name, force)?;

    println!("Created {}", path.display());
    println!("\nNext steps:");
    println!("  1. Edit {name} to declare rules for this tree");
    println!("  2. Add {name} files in subdirectories to extend them");
    println!("  3. Run: profanity check");

    Ok(())
}

fn run_in(dir: &Path, name: &str, force: bool) -> Result<PathBuf> {
    let rules_path = dir.join(name);

    if rules_path.exists() && !force {
        bail!(
            "Rules file already exists at {}. Use --force to overwrite.",
            rules_path.display()
        );
    }

    std::fs::write(&rules_path, STARTER_RULES)
        .with_context(|| format!("Failed to write {}", rules_path.display()))?;

    Ok(rules_path)
}
