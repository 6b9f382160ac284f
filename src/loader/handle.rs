// Retriever handle - immutable result of the one-shot load
use anyhow::{bail, Result};
use std::fmt;
use std::sync::Arc;

use crate::artifacts::{MetadataTable, VectorIndex};
use crate::embedding::Embedder;
use crate::loader::ResourceState;

/// Artifacts held in memory for a ready catalog
pub struct LoadedArtifacts {
    pub embedder: Arc<dyn Embedder>,
    pub index: VectorIndex,
    pub metadata: MetadataTable,
}

/// Published load outcome for one catalog.
///
/// Built once at startup and shared read-only (behind an `Arc`) by every
/// request. `artifacts()` is `Some` exactly when the state is ready.
pub struct RetrieverHandle {
    catalog: String,
    state: ResourceState,
    artifacts: Option<LoadedArtifacts>,
}

impl RetrieverHandle {
    /// Catalog that was never loaded
    pub fn unloaded(catalog: impl Into<String>) -> Self {
        Self {
            catalog: catalog.into(),
            state: ResourceState::Unloaded,
            artifacts: None,
        }
    }

    /// Catalog whose artifacts could not be loaded
    pub fn failed(catalog: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            catalog: catalog.into(),
            state: ResourceState::Failed {
                reason: reason.into(),
            },
            artifacts: None,
        }
    }

    /// Ready catalog; refuses inconsistent artifacts
    pub fn ready(
        catalog: impl Into<String>,
        embedder: Arc<dyn Embedder>,
        index: VectorIndex,
        metadata: MetadataTable,
    ) -> Result<Self> {
        if metadata.len() != index.len() {
            bail!(
                "Row count mismatch: metadata has {} rows, index has {} vectors",
                metadata.len(),
                index.len()
            );
        }
        if embedder.dimension() != index.dimension() {
            bail!(
                "Dimension mismatch: model produces {}, index holds {}",
                embedder.dimension(),
                index.dimension()
            );
        }

        Ok(Self {
            catalog: catalog.into(),
            state: ResourceState::Ready {
                rows: metadata.len(),
            },
            artifacts: Some(LoadedArtifacts {
                embedder,
                index,
                metadata,
            }),
        })
    }

    pub fn catalog(&self) -> &str {
        &self.catalog
    }

    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    pub fn artifacts(&self) -> Option<&LoadedArtifacts> {
        self.artifacts.as_ref()
    }
}

impl fmt::Debug for RetrieverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrieverHandle")
            .field("catalog", &self.catalog)
            .field("state", &self.state)
            .finish()
    }
}
