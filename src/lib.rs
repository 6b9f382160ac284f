//! Pre-Clear - Hybrid Trade Compliance Recommender
//!
//! Combines a deterministic rule table with semantic nearest-neighbor
//! retrieval over pre-built embedding indexes. Serves two questions:
//! which HS codes best describe a product, and which compliance documents
//! a shipment needs.
//!
//! # Architecture
//!
//! - **Artifacts**: metadata table, vector index and raw embeddings per catalog
//! - **Loader**: one-shot, best-effort load into an immutable handle
//! - **Retrieval**: embed, normalize, top-k search
//! - **Rules**: TOML rule table, always evaluated
//! - **Scoring**: rules first, semantic items appended
//! - **Server**: axum endpoints over the above

// Core domain
pub mod errors;
pub mod types;

// Ambient
pub mod config;
pub mod telemetry;
pub mod cli;

// Learned path
pub mod artifacts;
pub mod embedding;
pub mod loader;
pub mod retrieval;

// Deterministic path and merge
pub mod rules;
pub mod scoring;

// Startup, diagnostics and HTTP
pub mod bootstrap;
pub mod doctor;
pub mod server;

// Re-export commonly used types
pub use errors::{RecommenderError, Result};
pub use types::{FreeTextQuery, Recommendation, StructuredQuery, SuggestResponse};
