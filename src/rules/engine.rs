// Rule table - TOML-driven deterministic document requirements
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::errors::{RecommenderError, Result};
use crate::rules::{RuleEngine, RuleOutcome};
use crate::types::StructuredQuery;

/// Match conditions; every non-empty condition must hold.
///
/// List conditions match when any entry matches. An empty list places no
/// constraint, but a non-empty list never matches a blank query field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Conditions {
    /// Case-insensitive country names or codes
    pub origin_country: Vec<String>,
    pub destination_country: Vec<String>,
    /// Prefixes of the digits of the HS code
    pub hs_prefix: Vec<String>,
    /// Case-insensitive substrings of category or description
    pub keywords: Vec<String>,
    pub mode_of_transport: Vec<String>,
    pub hts_flag: Option<bool>,
}

impl Conditions {
    pub fn matches(&self, query: &StructuredQuery) -> bool {
        any_equal(&self.origin_country, &query.origin_country)
            && any_equal(&self.destination_country, &query.destination_country)
            && any_equal(&self.mode_of_transport, &query.mode_of_transport)
            && self.hs_prefix_matches(&query.hs_code)
            && self.keywords_match(query)
            && self.hts_flag.map_or(true, |flag| flag == query.hts_flag)
    }

    fn hs_prefix_matches(&self, hs_code: &str) -> bool {
        if self.hs_prefix.is_empty() {
            return true;
        }
        let digits: String = hs_code.chars().filter(char::is_ascii_digit).collect();
        !digits.is_empty() && self.hs_prefix.iter().any(|p| digits.starts_with(p.as_str()))
    }

    fn keywords_match(&self, query: &StructuredQuery) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let text = format!("{} {}", query.product_category, query.product_description).to_lowercase();
        self.keywords
            .iter()
            .any(|k| text.contains(k.to_lowercase().as_str()))
    }
}

fn any_equal(allowed: &[String], value: &str) -> bool {
    if allowed.is_empty() {
        return true;
    }
    let value = value.trim();
    !value.is_empty() && allowed.iter().any(|a| a.trim().eq_ignore_ascii_case(value))
}

/// One rule: when the conditions hold, the documents are required
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    pub name: String,
    pub documents: Vec<String>,
    pub reason: String,
    #[serde(default)]
    pub when: Conditions,
}

/// Ordered rule table; evaluation order is declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default, rename = "rule")]
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Build from rules, rejecting rules with nothing to require
    pub fn new(rules: Vec<Rule>) -> Result<Self> {
        for rule in &rules {
            if rule.documents.iter().all(|d| d.trim().is_empty()) {
                return Err(RecommenderError::Configuration(format!(
                    "rule '{}' requires no documents",
                    rule.name
                )));
            }
            if rule.reason.trim().is_empty() {
                return Err(RecommenderError::Configuration(format!(
                    "rule '{}' has no reason",
                    rule.name
                )));
            }
        }
        Ok(Self { rules })
    }

    /// Parse a `[[rule]]` table
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let parsed: RuleSet = toml::from_str(contents)
            .map_err(|e| RecommenderError::Configuration(format!("invalid rule file: {}", e)))?;
        Self::new(parsed.rules)
    }

    /// Load a rule file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RecommenderError::Configuration(format!(
                "cannot read rule file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl RuleEngine for RuleSet {
    fn evaluate(&self, query: &StructuredQuery) -> Result<RuleOutcome> {
        let mut outcome = RuleOutcome::new();
        for rule in self.rules.iter().filter(|r| r.when.matches(query)) {
            debug!(rule = %rule.name, "rule matched");
            for document in rule.documents.iter().filter(|d| !d.trim().is_empty()) {
                outcome.require(document.trim(), rule.reason.as_str());
            }
        }
        Ok(outcome)
    }
}
