//! Shared fixtures: a deterministic embedder and on-disk catalogs

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use preclear::artifacts::{l2_normalize, ArtifactPaths, MetadataTable, VectorIndex};
use preclear::embedding::Embedder;
use preclear::loader::{ResourceLoader, RetrieverHandle};

/// One dimension per synonym group; a group fires when any term occurs
pub struct KeywordEmbedder {
    groups: Vec<Vec<&'static str>>,
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new(groups: Vec<Vec<&'static str>>) -> Self {
        Self {
            groups,
            calls: AtomicUsize::new(0),
        }
    }

    /// Vocabulary for the HS fixture; "bike" and "bicycle" share a dimension
    pub fn hs() -> Self {
        Self::new(vec![
            vec!["bolt"],
            vec!["screw"],
            vec!["bicycle", "bike"],
            vec!["part"],
        ])
    }

    /// Vocabulary for the document fixture
    pub fn documents() -> Self {
        Self::new(vec![
            vec!["pharma", "medicine"],
            vec!["chemical", "solvent"],
            vec!["origin", "us"],
            vec!["permit", "import"],
            vec!["fruit", "food"],
        ])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for KeywordEmbedder {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = text.to_lowercase();
        Ok(self
            .groups
            .iter()
            .map(|terms| {
                if terms.iter().any(|t| text.contains(t)) {
                    1.0
                } else {
                    0.0
                }
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        self.groups.len()
    }

    fn name(&self) -> &str {
        "keyword-test-embedder"
    }
}

pub const HS_RECORDS: [(&str, &str); 3] = [
    ("HS1", "bolts"),
    ("HS2", "screws"),
    ("HS3", "bicycle parts"),
];

pub const DOCUMENT_RECORDS: [(&str, &str); 5] = [
    ("GMP Certificate", "pharma medicine shipment"),
    ("Safety Data Sheet", "chemical solvent shipment"),
    ("Certificate of Origin", "us origin goods"),
    ("Import Permit", "import permit for medicine"),
    ("Phytosanitary Certificate", "fresh fruit food"),
];

/// Write meta.csv, index.safetensors and embeddings.npy for `records`
pub fn write_catalog(
    dir: &Path,
    id_column: &str,
    records: &[(&str, &str)],
    embedder: &dyn Embedder,
) -> ArtifactPaths {
    std::fs::create_dir_all(dir).unwrap();
    let paths = ArtifactPaths::in_dir(dir);

    MetadataTable::from_pairs(records.iter().copied())
        .save(&paths.metadata, id_column)
        .unwrap();

    let rows: Vec<Vec<f32>> = records
        .iter()
        .map(|(_, description)| {
            let mut v = embedder.embed(description).unwrap();
            l2_normalize(&mut v);
            v
        })
        .collect();
    let index = VectorIndex::from_rows(&rows).unwrap();
    index.save(&paths.index).unwrap();
    index.save_npy(&paths.embeddings).unwrap();

    paths
}

/// Load a catalog from disk with the given embedder
pub fn load_catalog(
    name: &str,
    paths: ArtifactPaths,
    id_column: &str,
    embedder: Arc<KeywordEmbedder>,
) -> RetrieverHandle {
    let loader = ResourceLoader::new(name, paths, id_column);
    loader.load(move || Ok(embedder as Arc<dyn Embedder>))
}

/// Ready HS catalog over [`HS_RECORDS`] in `dir`
pub fn hs_catalog(dir: &Path) -> RetrieverHandle {
    let embedder = Arc::new(KeywordEmbedder::hs());
    let paths = write_catalog(dir, "hscode", &HS_RECORDS, embedder.as_ref());
    load_catalog("hs", paths, "hscode", embedder)
}

/// Ready document catalog over [`DOCUMENT_RECORDS`] in `dir`
pub fn documents_catalog(dir: &Path) -> RetrieverHandle {
    let embedder = Arc::new(KeywordEmbedder::documents());
    let paths = write_catalog(dir, "document", &DOCUMENT_RECORDS, embedder.as_ref());
    load_catalog("documents", paths, "document", embedder)
}

/// Ready HS catalog built in memory, no files involved
pub fn in_memory_hs() -> RetrieverHandle {
    let embedder = Arc::new(KeywordEmbedder::hs());
    let rows: Vec<Vec<f32>> = HS_RECORDS
        .iter()
        .map(|(_, description)| {
            let mut v = embedder.embed(description).unwrap();
            l2_normalize(&mut v);
            v
        })
        .collect();
    RetrieverHandle::ready(
        "hs",
        embedder,
        VectorIndex::from_rows(&rows).unwrap(),
        MetadataTable::from_pairs(HS_RECORDS),
    )
    .unwrap()
}
