//! Declarative content rules read from per-directory rules files.
//!
//! # Pipeline
//!
//! ```text
//! rules file (YAML sequence)
//!   ↓ serde (DTO layer)
//! dto::RuleDto
//!   ↓ loader: priority contains → notContains → regex, stamp origin
//! model::Rule
//! ```

pub mod dto;
pub mod loader;
pub mod model;

pub use loader::{parse_rules, FsRuleSource, LoadError, RuleSource, DEFAULT_RULES_FILE};
pub use model::{Check, Rule};
