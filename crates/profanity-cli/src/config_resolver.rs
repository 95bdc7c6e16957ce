//! Tool configuration lookup.
//!
//! The first match wins:
//!
//! 1. `--config` flag (explicit path, trusted as-is)
//! 2. `profanity.toml` or `.profanity.toml` in the scanned directory or the
//!    nearest ancestor holding one
//! 3. `~/.profanity/config.toml` (global fallback)
//! 4. defaults

use std::fmt;
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found in the scanned directory or one of its ancestors.
    Project(PathBuf),
    /// Found in the global config directory (`~/.profanity/`).
    Global(PathBuf),
    /// Nothing found; defaults apply.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` if the config came from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "{} (--config)", p.display()),
            Self::Project(p) => write!(f, "{} (project)", p.display()),
            Self::Global(p) => write!(f, "{} (global)", p.display()),
            Self::Default => f.write_str("built-in defaults"),
        }
    }
}

/// Project-level config file names, checked in order within a directory.
const PROJECT_CONFIG_NAMES: &[&str] = &["profanity.toml", ".profanity.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration for a scan of `scan_dir`.
#[must_use]
pub fn resolve(scan_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    let scan_dir = if scan_dir.is_absolute() {
        scan_dir.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| scan_dir.to_path_buf(), |cwd| cwd.join(scan_dir))
    };
    let source = resolve_inner(&scan_dir, explicit, global_config_dir());
    tracing::debug!("Configuration: {source}");
    source
}

/// Testable core: takes `global_dir` as a parameter to avoid env var races.
fn resolve_inner(
    scan_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = find_project_config(scan_dir) {
        return ConfigSource::Project(found);
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, ConfigSource::Global)
}

/// Nearest project config at or above `dir`.
fn find_project_config(dir: &Path) -> Option<PathBuf> {
    dir.ancestors().find_map(|ancestor| {
        PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| ancestor.join(name))
            .find(|candidate| candidate.is_file())
    })
}

/// Returns the global config directory.
///
/// `$PROFANITY_CONFIG_DIR` if set, else `~/.profanity/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("PROFANITY_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".profanity"))
}
