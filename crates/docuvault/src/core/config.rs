//! Configuration loading.
//!
//! The rule set and its plugin bindings are supplied as TOML at process
//! start and treated as read-only afterwards:
//!
//! ```toml
//! storage_root = "/var/lib/docuvault"
//!
//! [[rule]]
//! id = 2
//! name = "Adlibre Invoices"
//! pattern = 'ADL-\d+'
//! canonical_code = "ADL-1234"
//!
//! [[rule.binding]]
//! stage = "before_store"
//! plugin = "filetype-validator"
//! ordinal = 1
//! options = { allowed_mimetypes = ["application/pdf"] }
//!
//! [[rule.binding]]
//! stage = "store"
//! plugin = "local-storage"
//! ordinal = 1
//! ```

use crate::error::{DocuvaultError, Result};
use crate::plugins::Stage;
use crate::rules::{DocTypeRule, RuleSet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_true() -> bool {
    true
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("storage")
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DmsConfig {
    /// Root directory for the local storage backend.
    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,

    /// Document type rules, in matching priority order.
    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleConfig>,
}

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            storage_root: default_storage_root(),
            rules: Vec::new(),
        }
    }
}

/// One configured document type rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    pub id: u32,
    pub name: String,
    /// Code pattern; anchored to the full code on compilation.
    pub pattern: String,
    #[serde(default = "default_true")]
    pub active: bool,
    /// Representative code for the registration-time ambiguity probe.
    #[serde(default)]
    pub canonical_code: Option<String>,
    #[serde(default, rename = "binding")]
    pub bindings: Vec<BindingConfig>,
}

/// One plugin binding within a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingConfig {
    pub stage: Stage,
    /// Registered plugin identifier.
    pub plugin: String,
    /// Execution position within the (rule, stage) chain; unique per chain.
    pub ordinal: u32,
    /// Plugin-specific options, passed through to the worker.
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl DmsConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| DocuvaultError::validation_with_source("failed to parse configuration", e))
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DocuvaultError::validation_with_source(
                format!("cannot read configuration file {}", path.display()),
                e,
            )
        })?;
        Self::from_toml_str(&content)
    }

    /// Compile the configured rules into a [`RuleSet`], running the
    /// registration-time integrity checks.
    pub fn build_rules(&self) -> Result<RuleSet> {
        let rules = self
            .rules
            .iter()
            .map(|r| DocTypeRule::new(r.id, r.name.clone(), &r.pattern, r.active, r.canonical_code.clone()))
            .collect::<Result<Vec<_>>>()?;
        RuleSet::new(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
storage_root = "/tmp/docuvault-test"

[[rule]]
id = 2
name = "Adlibre Invoices"
pattern = 'ADL-\d+'
canonical_code = "ADL-1234"

[[rule.binding]]
stage = "before_store"
plugin = "filetype-validator"
ordinal = 1
options = { allowed_mimetypes = ["application/pdf"], max_bytes = 1048576 }

[[rule.binding]]
stage = "store"
plugin = "local-storage"
ordinal = 1

[[rule.binding]]
stage = "after_store"
plugin = "tagger"
ordinal = 1

[[rule]]
id = 3
name = "Test PDFs"
pattern = 'TST\d{8}'
active = false
"#;

    #[test]
    fn test_parse_sample() {
        let config = DmsConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.storage_root, PathBuf::from("/tmp/docuvault-test"));
        assert_eq!(config.rules.len(), 2);

        let invoices = &config.rules[0];
        assert_eq!(invoices.name, "Adlibre Invoices");
        assert!(invoices.active);
        assert_eq!(invoices.bindings.len(), 3);

        let validator = &invoices.bindings[0];
        assert_eq!(validator.stage, Stage::BeforeStore);
        assert_eq!(validator.plugin, "filetype-validator");
        assert_eq!(
            validator.options.get("max_bytes").and_then(|v| v.as_u64()),
            Some(1_048_576)
        );

        assert!(!config.rules[1].active);
    }

    #[test]
    fn test_defaults() {
        let config = DmsConfig::from_toml_str("").unwrap();
        assert_eq!(config.storage_root, PathBuf::from("storage"));
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let err = DmsConfig::from_toml_str("rule = 'not a table'").unwrap_err();
        assert!(matches!(err, DocuvaultError::Validation { .. }));
    }

    #[test]
    fn test_unknown_stage_rejected() {
        let bad = r#"
[[rule]]
id = 1
name = "Broken"
pattern = 'X\d+'

[[rule.binding]]
stage = "during_store"
plugin = "local-storage"
ordinal = 1
"#;
        assert!(DmsConfig::from_toml_str(bad).is_err());
    }

    #[test]
    fn test_build_rules() {
        let config = DmsConfig::from_toml_str(SAMPLE).unwrap();
        let rules = config.build_rules().unwrap();
        assert_eq!(rules.match_code("ADL-1985").unwrap().name, "Adlibre Invoices");
        // Inactive rule never matches.
        assert!(rules.match_code("TST12345678").is_err());
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dms.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = DmsConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.rules.len(), 2);

        let missing = DmsConfig::from_toml_file(dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(DocuvaultError::Validation { .. })));
    }
}
