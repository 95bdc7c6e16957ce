//! YAML deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization of a rules file.
//! They are converted to [`Rule`](super::model::Rule) values via the loader.

use serde::Deserialize;

/// Raw representation of one record in a rules file.
///
/// ```yaml
/// - message: "no TODOs in shipped code"
///   contains: "TODO"
///   include: "*.go, *.rs"
///   exclude: "*_test.go"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleDto {
    /// Descriptive message shown when the rule is violated.
    #[serde(default)]
    pub message: Option<String>,
    /// Fail if a file contains this literal.
    #[serde(default)]
    pub contains: Option<String>,
    /// Fail if a file does not contain this literal.
    #[serde(default)]
    pub not_contains: Option<String>,
    /// Fail if this regular expression matches a file.
    #[serde(default)]
    pub regex: Option<String>,
    /// Comma-separated glob list; the rule only applies to matching files.
    #[serde(default)]
    pub include: Option<String>,
    /// Comma-separated glob list; the rule never applies to matching files.
    #[serde(default)]
    pub exclude: Option<String>,
}

impl RuleDto {
    /// Number of check fields that carry a non-empty value.
    #[must_use]
    pub fn populated_checks(&self) -> usize {
        [&self.contains, &self.not_contains, &self.regex]
            .into_iter()
            .filter(|field| field.as_deref().is_some_and(|v| !v.is_empty()))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_camel_case_fields() {
        let yaml = r#"
- message: "license header required"
  notContains: "LICENSE"
  include: "*.go"
"#;
        let dtos: Vec<RuleDto> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(dtos.len(), 1);
        assert_eq!(dtos[0].not_contains.as_deref(), Some("LICENSE"));
        assert_eq!(dtos[0].include.as_deref(), Some("*.go"));
        assert!(dtos[0].contains.is_none());
        assert!(dtos[0].exclude.is_none());
    }

    #[test]
    fn rejects_unknown_fields() {
        let yaml = "- contain: \"TODO\"\n";
        let result: Result<Vec<RuleDto>, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn populated_checks_ignores_empty_strings() {
        let dto = RuleDto {
            contains: Some(String::new()),
            regex: Some("a+".to_string()),
            ..RuleDto::default()
        };
        assert_eq!(dto.populated_checks(), 1);
    }
}
