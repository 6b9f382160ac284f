//! Per-request result types
//!
//! Produced per query and discarded once the response is written.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which engine produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Rule,
    Semantic,
}

/// A scored candidate from either engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub id: String,
    /// Record description for semantic matches, the rule reason for rule matches
    pub description: String,
    /// Cosine similarity for semantic matches, 1.0 for rule matches
    pub score: f32,
    pub source: MatchSource,
}

impl CandidateMatch {
    pub fn semantic(id: impl Into<String>, description: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            score,
            source: MatchSource::Semantic,
        }
    }

    pub fn rule(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: reason.into(),
            score: 1.0,
            source: MatchSource::Rule,
        }
    }
}

/// Merged hybrid response for a structured query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Rule items first, then semantic items by descending score
    pub required_documents: Vec<String>,
    pub documents_with_scores: BTreeMap<String, f64>,
    pub explanations: BTreeMap<String, String>,
}

impl Recommendation {
    pub fn len(&self) -> usize {
        self.required_documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.required_documents.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents_with_scores.contains_key(id)
    }
}

/// One classification code suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub hscode: String,
    pub description: String,
    pub score: f32,
}

impl From<CandidateMatch> for Suggestion {
    fn from(candidate: CandidateMatch) -> Self {
        Self {
            hscode: candidate.id,
            description: candidate.description,
            score: candidate.score,
        }
    }
}

/// Free-text response body; always returned, possibly empty
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<Suggestion>,
}

impl From<Vec<CandidateMatch>> for SuggestResponse {
    fn from(candidates: Vec<CandidateMatch>) -> Self {
        Self {
            suggestions: candidates.into_iter().map(Suggestion::from).collect(),
        }
    }
}
