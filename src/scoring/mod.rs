// Hybrid Scorer Module
//
// Merges rule output with semantic output into one ranked, explained
// recommendation.

pub mod hybrid;

pub use hybrid::{merge, HybridScorer, ScoringConfig, MISSING_FIELDS_MESSAGE, RULE_CONFIDENCE};
