// Hybrid Scorer - rules first, semantic matches appended
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::{RecommenderError, Result};
use crate::retrieval::SemanticRetriever;
use crate::rules::{RuleEngine, RuleOutcome};
use crate::types::{CandidateMatch, Recommendation, StructuredQuery};

/// Confidence assigned to every rule-derived item
pub const RULE_CONFIDENCE: f64 = 1.0;

/// Client-facing message for queries without any signal
pub const MISSING_FIELDS_MESSAGE: &str = "At least one of: origin_country, destination_country, hs_code, product_category, or product_description must be provided.";

/// Weighting for learned items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Neighbors requested from the document catalog
    pub semantic_top_k: usize,
    /// Semantic matches scoring below this are dropped
    pub min_similarity: f32,
    /// Ceiling for semantic confidence; keeps learned items below rules
    pub max_semantic_confidence: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            semantic_top_k: 5,
            min_similarity: 0.35,
            max_semantic_confidence: 0.99,
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Merge rule output and semantic candidates.
///
/// Rule items come first, in rule order, with [`RULE_CONFIDENCE`] and their
/// rule reason; a semantic duplicate of a rule item is discarded. Remaining
/// semantic items at or above `min_similarity` follow in descending score
/// order, one entry per id.
pub fn merge(
    rules: &RuleOutcome,
    semantic: Vec<CandidateMatch>,
    config: &ScoringConfig,
) -> Recommendation {
    let mut recommendation = Recommendation::default();

    for candidate in rules.candidates() {
        recommendation.required_documents.push(candidate.id.clone());
        recommendation
            .documents_with_scores
            .insert(candidate.id.clone(), RULE_CONFIDENCE);
        recommendation
            .explanations
            .insert(candidate.id, candidate.description);
    }

    let mut learned: Vec<CandidateMatch> = semantic
        .into_iter()
        .filter(|c| !c.id.trim().is_empty())
        .filter(|c| c.score.is_finite() && c.score >= config.min_similarity)
        .filter(|c| !rules.contains(&c.id))
        .collect();
    learned.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut seen = HashSet::new();
    for candidate in learned {
        if !seen.insert(candidate.id.clone()) {
            continue;
        }
        let confidence = round4(
            candidate
                .score
                .clamp(0.0, config.max_semantic_confidence.max(0.0)) as f64,
        );
        recommendation.explanations.insert(
            candidate.id.clone(),
            format!(
                "Inferred from similar historical shipments (similarity {:.2}); not a mandatory rule",
                candidate.score
            ),
        );
        recommendation
            .documents_with_scores
            .insert(candidate.id.clone(), confidence);
        recommendation.required_documents.push(candidate.id);
    }

    recommendation
}

/// Combines the rule engine and the document catalog retriever
#[derive(Clone)]
pub struct HybridScorer {
    rules: Arc<dyn RuleEngine>,
    retriever: SemanticRetriever,
    config: ScoringConfig,
}

impl HybridScorer {
    pub fn new(rules: Arc<dyn RuleEngine>, retriever: SemanticRetriever, config: ScoringConfig) -> Self {
        Self {
            rules,
            retriever,
            config,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn retriever(&self) -> &SemanticRetriever {
        &self.retriever
    }

    /// Reject queries that give neither engine anything to work with
    pub fn validate(query: &StructuredQuery) -> Result<()> {
        if query.has_signal() {
            Ok(())
        } else {
            Err(RecommenderError::Validation(MISSING_FIELDS_MESSAGE.to_string()))
        }
    }

    /// Recommend documents for a structured query.
    ///
    /// Validation runs before either engine. Rules always run; the
    /// retriever only when its catalog is ready. Rule errors propagate.
    pub fn recommend(&self, query: &StructuredQuery) -> Result<Recommendation> {
        if let Err(err) = Self::validate(query) {
            warn!("rejected request: insufficient input fields");
            return Err(err);
        }

        let outcome = self.rules.evaluate(query)?;

        let semantic = if self.retriever.is_ready() {
            self.retriever
                .search(&query.semantic_fields(), self.config.semantic_top_k)
        } else {
            Vec::new()
        };
        let semantic_candidates = semantic.len();

        let recommendation = merge(&outcome, semantic, &self.config);
        info!(
            rule_documents = outcome.len(),
            semantic_candidates,
            recommended = recommendation.len(),
            semantic_ready = self.retriever.is_ready(),
            "prediction successful"
        );

        Ok(recommendation)
    }

    /// Run [`recommend`](Self::recommend) on the blocking pool
    pub async fn recommend_blocking(&self, query: StructuredQuery) -> Result<Recommendation> {
        if let Err(err) = Self::validate(&query) {
            warn!("rejected request: insufficient input fields");
            return Err(err);
        }

        let scorer = self.clone();
        tokio::task::spawn_blocking(move || scorer.recommend(&query))
            .await
            .map_err(|e| RecommenderError::Unexpected(format!("recommendation task failed: {}", e)))?
    }
}
