// Rule outcome - ordered, de-duplicated required items
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::CandidateMatch;

/// Items required by the rules plus a reason for each
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    required: Vec<String>,
    explanations: HashMap<String, String>,
}

impl RuleOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a required item; repeated items keep their first position and
    /// accumulate reasons
    pub fn require(&mut self, item: impl Into<String>, reason: impl Into<String>) {
        let item = item.into();
        let reason = reason.into();
        match self.explanations.get_mut(&item) {
            Some(existing) => {
                if !existing.split("; ").any(|r| r == reason) {
                    existing.push_str("; ");
                    existing.push_str(&reason);
                }
            }
            None => {
                self.required.push(item.clone());
                self.explanations.insert(item, reason);
            }
        }
    }

    /// Required items in first-seen order
    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn explanation(&self, item: &str) -> Option<&str> {
        self.explanations.get(item).map(String::as_str)
    }

    pub fn contains(&self, item: &str) -> bool {
        self.explanations.contains_key(item)
    }

    pub fn len(&self) -> usize {
        self.required.len()
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }

    /// Items paired with their explanations, in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.required.iter().map(move |item| {
            let reason = self.explanations.get(item).map(String::as_str).unwrap_or_default();
            (item.as_str(), reason)
        })
    }

    /// Required items as rule-sourced candidates, in order
    pub fn candidates(&self) -> Vec<CandidateMatch> {
        self.iter()
            .map(|(item, reason)| CandidateMatch::rule(item, reason))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_deduplicates() {
        let mut outcome = RuleOutcome::new();
        outcome.require("Commercial Invoice", "Always required");
        outcome.require("Packing List", "Always required");
        outcome.require("Commercial Invoice", "Customs valuation");
        outcome.require("Commercial Invoice", "Always required");

        assert_eq!(outcome.required(), &["Commercial Invoice", "Packing List"]);
        assert_eq!(
            outcome.explanation("Commercial Invoice"),
            Some("Always required; Customs valuation")
        );
    }

    #[test]
    fn test_iter_pairs_items_with_reasons() {
        let mut outcome = RuleOutcome::new();
        outcome.require("Air Waybill", "Air freight");
        let pairs: Vec<_> = outcome.iter().collect();
        assert_eq!(pairs, vec![("Air Waybill", "Air freight")]);
    }

    #[test]
    fn test_candidates_are_rule_sourced() {
        let mut outcome = RuleOutcome::new();
        outcome.require("Bill of Lading", "Sea freight");
        let candidates = outcome.candidates();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].source, crate::types::MatchSource::Rule);
        assert_eq!(candidates[0].description, "Sea freight");
    }
}
