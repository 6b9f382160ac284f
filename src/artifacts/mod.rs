//! Artifact Store access
//!
//! Read-only access to the three co-located artifacts produced offline for
//! one catalog: the reference metadata table, the fitted vector index and the
//! raw embeddings the index was built from.

pub mod index;
pub mod metadata;

pub use index::{embeddings_shape, l2_normalize, Neighbor, VectorIndex, NO_MATCH};
pub use metadata::{MetadataTable, ReferenceRecord};

use std::path::{Path, PathBuf};

pub const METADATA_FILE: &str = "meta.csv";
pub const INDEX_FILE: &str = "index.safetensors";
pub const EMBEDDINGS_FILE: &str = "embeddings.npy";

/// File locations of one catalog's artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub metadata: PathBuf,
    pub index: PathBuf,
    pub embeddings: PathBuf,
}

impl ArtifactPaths {
    /// Standard layout inside `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            metadata: dir.join(METADATA_FILE),
            index: dir.join(INDEX_FILE),
            embeddings: dir.join(EMBEDDINGS_FILE),
            dir,
        }
    }

    /// Artifacts that are not present on disk
    pub fn missing(&self) -> Vec<&Path> {
        [&self.metadata, &self.index, &self.embeddings]
            .into_iter()
            .filter(|p| !p.is_file())
            .map(PathBuf::as_path)
            .collect()
    }

    pub fn all_present(&self) -> bool {
        self.missing().is_empty()
    }
}
