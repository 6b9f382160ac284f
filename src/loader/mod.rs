//! Resource Loader
//!
//! Materializes one catalog's artifacts (metadata table, vector index,
//! embedding model) once at startup and publishes the outcome as an
//! immutable [`RetrieverHandle`]. Loading is best-effort: every failure
//! becomes [`ResourceState::Failed`] and the host keeps running in
//! rules-only mode.

pub mod handle;
pub mod resource_loader;
pub mod state;

pub use handle::{LoadedArtifacts, RetrieverHandle};
pub use resource_loader::ResourceLoader;
pub use state::ResourceState;
