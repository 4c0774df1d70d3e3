//! Document type rules and code matching.
//!
//! A [`DocTypeRule`] maps a code pattern (anchored regex) to a named
//! document type; the pipeline bound to that rule decides how matching
//! documents are validated and stored. Rules are read-only during request
//! processing: they are compiled once at startup into a [`RuleSet`], which
//! also runs the registration-time integrity checks.

use crate::error::{DocuvaultError, Result};
use regex::Regex;

/// A configured document type rule.
///
/// The pattern is matched against the full document code: patterns are
/// anchored on compilation, so `ADL-\d+` matches `ADL-1234` but not
/// `XADL-12345`.
#[derive(Debug, Clone)]
pub struct DocTypeRule {
    pub id: u32,
    pub name: String,
    pattern: Regex,
    pub active: bool,
    /// Representative code used by the registration-time ambiguity probe.
    pub canonical_code: Option<String>,
}

impl DocTypeRule {
    /// Compile a rule from its configured pattern.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        pattern: &str,
        active: bool,
        canonical_code: Option<String>,
    ) -> Result<Self> {
        let anchored = format!("^(?:{pattern})$");
        let pattern = Regex::new(&anchored).map_err(|e| {
            DocuvaultError::validation_with_source(format!("invalid pattern for rule '{}'", id), e)
        })?;
        Ok(Self {
            id,
            name: name.into(),
            pattern,
            active,
            canonical_code,
        })
    }

    /// Whether this rule matches the given document code.
    pub fn matches(&self, code: &str) -> bool {
        self.pattern.is_match(code)
    }
}

/// The full set of configured rules, in configuration-defined priority
/// order.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<DocTypeRule>,
}

impl RuleSet {
    /// Build a rule set, running registration-time integrity checks.
    ///
    /// Rule ids must be unique. Each rule's canonical code, when present,
    /// is probed against every active rule: more than one active match is
    /// an [`DocuvaultError::AmbiguousRule`] configuration error, reported
    /// rather than silently resolved by priority.
    pub fn new(rules: Vec<DocTypeRule>) -> Result<Self> {
        let mut seen_ids = std::collections::HashSet::new();
        for rule in &rules {
            if !seen_ids.insert(rule.id) {
                return Err(DocuvaultError::validation(format!(
                    "duplicate rule id {}",
                    rule.id
                )));
            }
        }

        for rule in rules.iter().filter(|r| r.active) {
            let Some(code) = rule.canonical_code.as_deref() else {
                continue;
            };
            if !rule.matches(code) {
                return Err(DocuvaultError::validation(format!(
                    "canonical code '{}' does not match its own rule '{}'",
                    code, rule.name
                )));
            }
            let matching: Vec<&str> = rules
                .iter()
                .filter(|r| r.active && r.matches(code))
                .map(|r| r.name.as_str())
                .collect();
            if matching.len() > 1 {
                return Err(DocuvaultError::AmbiguousRule {
                    message: format!(
                        "code '{}' matches {} active rules: {}",
                        code,
                        matching.len(),
                        matching.join(", ")
                    ),
                });
            }
        }

        Ok(Self { rules })
    }

    /// Find the rule for a document code.
    ///
    /// Iterates active rules in configuration order and returns the first
    /// match. Codes matching no active rule fail with
    /// [`DocuvaultError::NoMatchingRule`] — a recoverable user input error,
    /// not a fault.
    pub fn match_code(&self, code: &str) -> Result<&DocTypeRule> {
        self.rules
            .iter()
            .filter(|r| r.active)
            .find(|r| r.matches(code))
            .ok_or_else(|| DocuvaultError::NoMatchingRule {
                code: code.to_string(),
            })
    }

    /// Look up a rule by id, active or not.
    pub fn by_id(&self, id: u32) -> Option<&DocTypeRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// All rules, in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &DocTypeRule> {
        self.rules.iter()
    }
}
