// Semantic Retriever Module
pub mod engine;

pub use engine::{normalize_query, SemanticRetriever};
