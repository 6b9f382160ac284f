// Resource Loader - best-effort, one-shot artifact materialization
use anyhow::{bail, Context, Result};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{info, warn};

use crate::artifacts::{ArtifactPaths, MetadataTable, VectorIndex};
use crate::embedding::Embedder;
use crate::loader::{ResourceState, RetrieverHandle};

/// Loads one catalog's artifacts
#[derive(Debug, Clone)]
pub struct ResourceLoader {
    catalog: String,
    paths: ArtifactPaths,
    id_column: String,
}

impl ResourceLoader {
    pub fn new(
        catalog: impl Into<String>,
        paths: ArtifactPaths,
        id_column: impl Into<String>,
    ) -> Self {
        Self {
            catalog: catalog.into(),
            paths,
            id_column: id_column.into(),
        }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Attempt the load. Never fails and never panics past this call: any
    /// problem is recorded in the returned handle's state.
    ///
    /// `embedder` is only invoked once the on-disk artifacts are present and
    /// readable, so a catalog with missing files never triggers a model load.
    pub fn load<F>(&self, embedder: F) -> RetrieverHandle
    where
        F: FnOnce() -> Result<Arc<dyn Embedder>>,
    {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.try_load(embedder)));

        let handle = match outcome {
            Ok(Ok(handle)) => handle,
            Ok(Err(err)) => RetrieverHandle::failed(&self.catalog, format!("{:#}", err)),
            Err(_) => RetrieverHandle::failed(&self.catalog, "artifact loading panicked"),
        };

        match handle.state() {
            ResourceState::Ready { rows } => {
                info!(catalog = %self.catalog, rows, dir = %self.paths.dir.display(), "loaded model and index");
            }
            ResourceState::Failed { reason } => {
                warn!(catalog = %self.catalog, dir = %self.paths.dir.display(), %reason, "failed to load model/index, serving rules only");
            }
            ResourceState::Unloaded => {}
        }

        handle
    }

    fn try_load<F>(&self, embedder: F) -> Result<RetrieverHandle>
    where
        F: FnOnce() -> Result<Arc<dyn Embedder>>,
    {
        let missing = self.paths.missing();
        if !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(|p| p.display().to_string()).collect();
            bail!("missing artifact: {}", names.join(", "));
        }

        let metadata = MetadataTable::load(&self.paths.metadata, &self.id_column)?;
        let index = VectorIndex::load(&self.paths.index)?;
        let embedder = embedder().context("Failed to load embedding model")?;

        RetrieverHandle::ready(&self.catalog, embedder, index, metadata)
    }
}
