// Semantic Retriever - embed, normalize, top-k nearest-neighbor search
use std::sync::Arc;
use tracing::{debug, warn};

use crate::artifacts::l2_normalize;
use crate::errors::{RecommenderError, Result};
use crate::loader::RetrieverHandle;
use crate::types::{CandidateMatch, FreeTextQuery};

/// Join free-text fields with single spaces and lower-case the result
pub fn normalize_query(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Nearest-neighbor search over one catalog.
///
/// Cheap to clone; all clones share the same immutable handle.
#[derive(Debug, Clone)]
pub struct SemanticRetriever {
    handle: Arc<RetrieverHandle>,
}

impl SemanticRetriever {
    pub fn new(handle: Arc<RetrieverHandle>) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &RetrieverHandle {
        &self.handle
    }

    pub fn is_ready(&self) -> bool {
        self.handle.is_ready()
    }

    /// Top-k records for the given free-text fields.
    ///
    /// Returns at most `k` matches in descending score order. An unready
    /// catalog, a blank query or any embedding/search failure yields an
    /// empty list; this never errors.
    pub fn search(&self, fields: &[&str], k: usize) -> Vec<CandidateMatch> {
        if !self.handle.is_ready() || k == 0 {
            return Vec::new();
        }

        let text = normalize_query(fields);
        if text.is_empty() {
            debug!(catalog = self.handle.catalog(), "blank query, skipping search");
            return Vec::new();
        }

        match self.try_search(&text, k) {
            Ok(matches) => {
                debug!(catalog = self.handle.catalog(), k, returned = matches.len(), "semantic search");
                matches
            }
            Err(err) => {
                warn!(catalog = self.handle.catalog(), error = %err, "semantic search failed");
                Vec::new()
            }
        }
    }

    /// Search with a free-text query's own fields and `k`
    pub fn suggest(&self, query: &FreeTextQuery) -> Vec<CandidateMatch> {
        self.search(&query.fields(), query.limit())
    }

    /// Run [`search`](Self::search) on the blocking pool.
    ///
    /// The search runs to completion even if the returned future is dropped.
    pub async fn search_blocking(&self, fields: Vec<String>, k: usize) -> Vec<CandidateMatch> {
        let retriever = self.clone();
        let task = tokio::task::spawn_blocking(move || {
            let refs: Vec<&str> = fields.iter().map(String::as_str).collect();
            retriever.search(&refs, k)
        });

        match task.await {
            Ok(matches) => matches,
            Err(err) => {
                warn!(catalog = self.handle.catalog(), error = %err, "semantic search task failed");
                Vec::new()
            }
        }
    }

    fn try_search(&self, text: &str, k: usize) -> Result<Vec<CandidateMatch>> {
        let inference = |err: anyhow::Error| RecommenderError::Inference(format!("{:#}", err));
        let artifacts = self.handle.artifacts().ok_or_else(|| {
            RecommenderError::Inference(format!("catalog {} is not loaded", self.handle.catalog()))
        })?;

        let mut embedding = artifacts.embedder.embed(text).map_err(inference)?;
        if embedding.iter().any(|x| !x.is_finite()) {
            return Err(RecommenderError::Inference(
                "embedding contains non-finite values".to_string(),
            ));
        }
        l2_normalize(&mut embedding);

        let neighbors = artifacts.index.search(&embedding, k).map_err(inference)?;

        let matches = neighbors
            .into_iter()
            .filter(|n| n.is_match())
            .filter_map(|n| {
                let record = artifacts.metadata.get(n.row as usize)?;
                Some(CandidateMatch::semantic(
                    record.id.clone(),
                    record.description.clone(),
                    n.score.clamp(-1.0, 1.0),
                ))
            })
            .collect();

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{MetadataTable, VectorIndex};
    use crate::embedding::Embedder;
    use anyhow::{anyhow, Result};

    /// One dimension per known word
    struct WordEmbedder;

    const VOCAB: [&str; 3] = ["bolts", "screws", "bicycle"];

    impl Embedder for WordEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(VOCAB
                .iter()
                .map(|w| if text.contains(w) { 1.0 } else { 0.0 })
                .collect())
        }

        fn dimension(&self) -> usize {
            VOCAB.len()
        }
    }

    struct BrokenEmbedder;

    impl Embedder for BrokenEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(anyhow!("numeric error"))
        }

        fn dimension(&self) -> usize {
            VOCAB.len()
        }
    }

    fn retriever(embedder: Arc<dyn Embedder>) -> SemanticRetriever {
        let metadata =
            MetadataTable::from_pairs([("HS1", "bolts"), ("HS2", "screws"), ("HS3", "bicycle")]);
        let index = VectorIndex::from_rows(&[
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ])
        .unwrap();
        let handle = RetrieverHandle::ready("hs", embedder, index, metadata).unwrap();
        SemanticRetriever::new(Arc::new(handle))
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query(&["Bike", "", "  PARTS "]), "bike parts");
        assert_eq!(normalize_query(&["", "  "]), "");
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let retriever = retriever(Arc::new(WordEmbedder));
        let matches = retriever.search(&["SCREWS"], 1);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "HS2");
        assert!((matches[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_k_larger_than_index_drops_sentinels() {
        let retriever = retriever(Arc::new(WordEmbedder));
        let matches = retriever.search(&["bolts"], 10);
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].id, "HS1");
    }

    #[test]
    fn test_embedding_failure_yields_empty() {
        let retriever = retriever(Arc::new(BrokenEmbedder));
        assert!(retriever.search(&["bolts"], 2).is_empty());

        let err = retriever.try_search("bolts", 2).unwrap_err();
        assert!(matches!(err, RecommenderError::Inference(_)));
        assert!(err.to_string().contains("numeric error"));
    }

    #[test]
    fn test_huge_k_returns_every_row_once() {
        let retriever = retriever(Arc::new(WordEmbedder));
        let matches = retriever.search(&["bicycle"], 1usize << 40);
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].id, "HS3");
    }

    #[test]
    fn test_unready_yields_empty() {
        let handle = RetrieverHandle::failed("hs", "missing artifact");
        let retriever = SemanticRetriever::new(Arc::new(handle));
        assert!(retriever.suggest(&FreeTextQuery::new("bolts", "", "", 3)).is_empty());
    }

    #[test]
    fn test_blank_query_and_zero_k_yield_empty() {
        let retriever = retriever(Arc::new(WordEmbedder));
        assert!(retriever.search(&["", " "], 3).is_empty());
        assert!(retriever.search(&["bolts"], 0).is_empty());
    }

    #[tokio::test]
    async fn test_search_blocking_matches_sync() {
        let retriever = retriever(Arc::new(WordEmbedder));
        let sync = retriever.search(&["bicycle"], 2);
        let blocking = retriever
            .search_blocking(vec!["bicycle".to_string()], 2)
            .await;
        assert_eq!(sync, blocking);
    }
}
