//! Rule catalog schema.
//!
//! A catalog carries the ignored directory names and the three rule sets
//! consulted by the detectors. It is plain YAML so a project can check one in
//! next to its sources.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::rules::{compile_glob, Rule};
use crate::signals::SignalType;

/// The catalog written by `stacklens init` and used when none is found.
pub const DEFAULT_CATALOG_YAML: &str = include_str!("templates/default.yaml");

/// Top-level catalog definition.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RuleCatalog {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub name: String,
    /// Path segments pruned from every walk
    #[serde(default)]
    pub ignored_directories: Vec<String>,
    #[serde(default)]
    pub language_rules: Vec<Rule>,
    #[serde(default)]
    pub framework_rules: Vec<Rule>,
    #[serde(default)]
    pub infra_rules: Vec<Rule>,
}

impl RuleCatalog {
    /// Parse a catalog from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse a catalog from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, CatalogError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// The embedded default catalog.
    pub fn default_catalog() -> Result<Self, CatalogError> {
        Self::from_yaml(DEFAULT_CATALOG_YAML)
    }

    /// Check the catalog for rules the engine would silently drop.
    pub fn validate(&self) -> Result<(), CatalogError> {
        validate(self)
    }
}

/// Validate a catalog for correctness.
pub fn validate(catalog: &RuleCatalog) -> Result<(), CatalogError> {
    let sections = [
        ("language_rules", &catalog.language_rules),
        ("framework_rules", &catalog.framework_rules),
        ("infra_rules", &catalog.infra_rules),
    ];

    for (section, rules) in sections {
        for (index, rule) in rules.iter().enumerate() {
            let at = format!("{}[{}]", section, index);

            if rule.label.trim().is_empty() {
                return Err(CatalogError::Invalid(format!("{}: empty label", at)));
            }
            if rule.signal_value.trim().is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "{} ({}): empty signal_value",
                    at, rule.label
                )));
            }
            if rule.weight == 0 {
                return Err(CatalogError::Invalid(format!(
                    "{} ({}): weight must be at least 1",
                    at, rule.label
                )));
            }
            if rule.signal_type == SignalType::Glob {
                compile_glob(&rule.normalized_value()).map_err(|e| {
                    CatalogError::Invalid(format!(
                        "{} ({}): invalid glob {:?}: {}",
                        at, rule.label, rule.signal_value, e
                    ))
                })?;
            }
        }
    }

    for (index, rule) in catalog.language_rules.iter().enumerate() {
        if rule.signal_type != SignalType::Extension {
            return Err(CatalogError::Invalid(format!(
                "language_rules[{}] ({}): signal_type must be extension, got {}",
                index, rule.label, rule.signal_type
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog() {
        let yaml = r#"
version: "1"
name: "Test Catalog"
ignored_directories: [".git", "node_modules"]
language_rules:
  - label: python
    signal_type: extension
    signal_value: py
framework_rules:
  - label: express
    signal_type: node_dependency
    signal_value: express
    weight: 5
"#;
        let catalog = RuleCatalog::from_yaml(yaml).unwrap();
        assert_eq!(catalog.name, "Test Catalog");
        assert_eq!(catalog.ignored_directories, vec![".git", "node_modules"]);
        assert_eq!(catalog.language_rules[0].weight, 1);
        assert_eq!(catalog.framework_rules[0].weight, 5);
        assert!(catalog.infra_rules.is_empty());
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = RuleCatalog::default_catalog().unwrap();
        assert_eq!(catalog.name, "default");
        assert!(catalog.ignored_directories.iter().any(|d| d == "node_modules"));
        assert!(!catalog.language_rules.is_empty());
        assert!(!catalog.framework_rules.is_empty());
        assert!(!catalog.infra_rules.is_empty());
        validate(&catalog).unwrap();
    }

    #[test]
    fn test_language_rules_must_use_extensions() {
        let yaml = r#"
language_rules:
  - { label: python, signal_type: file, signal_value: setup.py }
"#;
        let err = RuleCatalog::from_yaml(yaml).unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("must be extension"));
    }

    #[test]
    fn test_zero_weight_rejected() {
        let yaml = r#"
infra_rules:
  - { label: Docker, signal_type: file, signal_value: Dockerfile, weight: 0 }
"#;
        let err = RuleCatalog::from_yaml(yaml).unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("infra_rules[0]"));
    }

    #[test]
    fn test_invalid_glob_rejected() {
        let yaml = r#"
infra_rules:
  - { label: Broken, signal_type: glob, signal_value: "[oops" }
"#;
        let err = RuleCatalog::from_yaml(yaml).unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("invalid glob"));
    }

    #[test]
    fn test_unknown_signal_type_is_parse_error() {
        let yaml = r#"
infra_rules:
  - { label: X, signal_type: registry, signal_value: x }
"#;
        assert!(matches!(
            RuleCatalog::from_yaml(yaml),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = RuleCatalog::parse_file("/nonexistent/stacklens.yaml");
        assert!(matches!(result, Err(CatalogError::Read(_))));
    }
}
