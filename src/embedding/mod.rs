//! Embedding model
//!
//! The [`Embedder`] trait is the seam between the retriever and the model.
//! [`EmbeddingEngine`] is the production implementation, a sentence-transformer
//! BERT model run locally through Candle.

pub mod engine;

pub use engine::{EmbeddingEngine, ModelConfig};

use anyhow::Result;

/// Turns text into a fixed-dimension vector
pub trait Embedder: Send + Sync {
    /// Embed a single text; the result is not normalized
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Output dimension
    fn dimension(&self) -> usize;

    /// Model identifier for diagnostics
    fn name(&self) -> &str {
        "embedder"
    }
}
