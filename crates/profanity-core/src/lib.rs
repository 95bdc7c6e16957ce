//! # profanity-core
//!
//! Hierarchical content-policy linting.
//!
//! Every directory of a tree may hold a rules file (`PROFANITY` by default).
//! Files are checked against the rules of the scan root, of every ancestor
//! directory and of their own directory. A rule either forbids a literal,
//! requires a literal, or forbids a regular expression match, and may be
//! narrowed to a subset of files by include and exclude globs.
//!
//! - [`Rule`] and [`Check`] model one policy entry
//! - [`RuleResolver`] merges inherited rules for a directory
//! - [`Evaluator`] applies a rule list to a file
//! - [`Scanner`] walks a tree and reports [`Violation`]s
//!
//! ## Example
//!
//! ```ignore
//! use profanity_core::Scanner;
//!
//! let scanner = Scanner::builder()
//!     .root(".")
//!     .exclude("vendor/*")
//!     .build()?;
//!
//! let result = scanner.scan()?;
//! for violation in &result.violations {
//!     println!("{violation}");
//! }
//! println!("{}", result.summary());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod evaluator;
mod filter;
mod matcher;
mod patterns;
mod resolver;
mod scanner;
mod types;

/// Rule model and rules file loading.
pub mod rules;

pub use cache::ResolutionCache;
pub use config::{Config, ConfigError, FailPolicy, ScanConfig};
pub use evaluator::Evaluator;
pub use filter::GlobFilter;
pub use patterns::{PatternCache, PatternError};
pub use resolver::{PackageRuleIndex, RuleResolver};
pub use rules::{Check, FsRuleSource, LoadError, Rule, RuleSource, DEFAULT_RULES_FILE};
pub use scanner::{ScanError, Scanner, ScannerBuilder};
pub use types::{ScanResult, Violation, ViolationDiagnostic, NO_RULE_SET};
