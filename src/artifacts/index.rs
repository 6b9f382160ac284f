// Vector index - flat inner-product search over L2-normalized embeddings
use anyhow::{anyhow, bail, Context, Result};
use candle_core::{DType, Device, Tensor};
use std::path::Path;

/// Name of the tensor holding the indexed vectors
pub const INDEX_TENSOR: &str = "vectors";

/// Row index returned for slots the index could not fill
pub const NO_MATCH: i64 = -1;

/// One (score, row) pair as returned by the index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub score: f32,
    pub row: i64,
}

impl Neighbor {
    fn empty() -> Self {
        Self {
            score: f32::MIN,
            row: NO_MATCH,
        }
    }

    pub fn is_match(&self) -> bool {
        self.row >= 0
    }
}

/// Normalize a vector to unit length in place; zero vectors are left as is
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Flat inner-product index held as a `[rows, dim]` tensor
#[derive(Debug, Clone)]
pub struct VectorIndex {
    vectors: Tensor,
    rows: usize,
    dim: usize,
}

impl VectorIndex {
    /// Wrap an existing `[rows, dim]` tensor
    pub fn from_tensor(tensor: Tensor) -> Result<Self> {
        let (rows, dim) = tensor
            .dims2()
            .context("Vector index must be a 2-D tensor")?;
        if dim == 0 {
            bail!("Vector index has zero dimension");
        }
        let vectors = tensor
            .to_dtype(DType::F32)
            .context("Failed to convert index to f32")?;
        let values = vectors.flatten_all()?.to_vec1::<f32>()?;
        if let Some(pos) = values.iter().position(|x| !x.is_finite()) {
            bail!("Vector index has a non-finite value in row {}", pos / dim);
        }
        Ok(Self { vectors, rows, dim })
    }

    /// Build from row vectors; every row must share one dimension
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let dim = rows
            .first()
            .map(Vec::len)
            .ok_or_else(|| anyhow!("Cannot build an index from zero rows"))?;
        if let Some(bad) = rows.iter().position(|r| r.len() != dim) {
            bail!("Row {} has dimension {}, expected {}", bad, rows[bad].len(), dim);
        }
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        let tensor = Tensor::from_vec(flat, (rows.len(), dim), &Device::Cpu)?;
        Self::from_tensor(tensor)
    }

    /// Read a serialized index
    pub fn load(path: &Path) -> Result<Self> {
        let mut tensors = candle_core::safetensors::load(path, &Device::Cpu)
            .with_context(|| format!("Failed to read vector index {}", path.display()))?;
        let tensor = tensors
            .remove(INDEX_TENSOR)
            .ok_or_else(|| anyhow!("Vector index has no '{}' tensor", INDEX_TENSOR))?;
        Self::from_tensor(tensor)
    }

    /// Serialize the index
    pub fn save(&self, path: &Path) -> Result<()> {
        self.vectors
            .save_safetensors(INDEX_TENSOR, path)
            .with_context(|| format!("Failed to write vector index {}", path.display()))
    }

    /// Write the raw vectors as `.npy`, the layout of the embeddings artifact
    pub fn save_npy(&self, path: &Path) -> Result<()> {
        self.vectors
            .write_npy(path)
            .with_context(|| format!("Failed to write embeddings {}", path.display()))
    }

    /// Number of indexed vectors
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn dimension(&self) -> usize {
        self.dim
    }

    /// Top-k search by inner product.
    ///
    /// Returns `min(k, len + 1)` entries in descending score order. When `k`
    /// exceeds the number of indexed vectors a single [`NO_MATCH`] slot marks
    /// the shortfall; padding never grows with `k`. Equal scores keep row
    /// order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dim {
            bail!(
                "Query dimension {} does not match index dimension {}",
                query.len(),
                self.dim
            );
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let scores = if self.rows == 0 {
            Vec::new()
        } else {
            let q = Tensor::from_slice(query, (self.dim, 1), &Device::Cpu)?;
            self.vectors.matmul(&q)?.flatten_all()?.to_vec1::<f32>()?
        };

        let mut ranked: Vec<Neighbor> = scores
            .into_iter()
            .enumerate()
            .map(|(row, score)| Neighbor {
                score,
                row: row as i64,
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(k);
        if ranked.len() < k {
            ranked.push(Neighbor::empty());
        }

        Ok(ranked)
    }
}

/// `(rows, dim)` of a raw embeddings `.npy` file
pub fn embeddings_shape(path: &Path) -> Result<(usize, usize)> {
    let tensor = Tensor::read_npy(path)
        .with_context(|| format!("Failed to read embeddings {}", path.display()))?;
    tensor
        .dims2()
        .context("Embeddings must be a 2-D array")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn unit(v: &[f32]) -> Vec<f32> {
        let mut v = v.to_vec();
        l2_normalize(&mut v);
        v
    }

    #[test]
    fn test_l2_normalize() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        l2_normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }

    #[test]
    fn test_search_orders_by_score() {
        let index = VectorIndex::from_rows(&[
            unit(&[1.0, 0.0]),
            unit(&[0.0, 1.0]),
            unit(&[1.0, 1.0]),
        ])
        .unwrap();

        let hits = index.search(&unit(&[1.0, 0.2]), 3).unwrap();
        let rows: Vec<i64> = hits.iter().map(|n| n.row).collect();
        assert_eq!(rows, vec![0, 2, 1]);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_search_marks_shortfall_with_sentinel() {
        let index = VectorIndex::from_rows(&[unit(&[1.0, 0.0])]).unwrap();
        let hits = index.search(&unit(&[1.0, 0.0]), 3).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].is_match());
        assert_eq!(hits[1].row, NO_MATCH);
    }

    #[test]
    fn test_huge_k_does_not_allocate_per_slot() {
        let index = VectorIndex::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let hits = index.search(&[1.0, 0.0], 1usize << 40).unwrap();
        assert_eq!(hits.iter().filter(|n| n.is_match()).count(), 2);
        assert!(hits.len() <= index.len() + 1);

        let hits = index.search(&[1.0, 0.0], usize::MAX).unwrap();
        assert_eq!(hits[0].row, 0);
    }

    #[test]
    fn test_non_finite_vectors_rejected() {
        assert!(VectorIndex::from_rows(&[vec![1.0, 0.0], vec![f32::NAN, 0.0]]).is_err());
        assert!(VectorIndex::from_rows(&[vec![f32::INFINITY, 0.0]]).is_err());
    }

    #[test]
    fn test_search_rejects_wrong_dimension() {
        let index = VectorIndex::from_rows(&[vec![1.0, 0.0]]).unwrap();
        assert!(index.search(&[1.0, 0.0, 0.0], 1).is_err());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        assert!(VectorIndex::from_rows(&[vec![1.0, 0.0], vec![1.0]]).is_err());
        assert!(VectorIndex::from_rows(&[]).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.safetensors");
        let index = VectorIndex::from_rows(&[unit(&[1.0, 2.0]), unit(&[2.0, 1.0])]).unwrap();
        index.save(&path).unwrap();

        let loaded = VectorIndex::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.dimension(), 2);
        let hits = loaded.search(&unit(&[2.0, 1.0]), 1).unwrap();
        assert_eq!(hits[0].row, 1);
    }

    #[test]
    fn test_embeddings_shape() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("embeddings.npy");
        let index = VectorIndex::from_rows(&[vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]).unwrap();
        index.save_npy(&path).unwrap();

        assert_eq!(embeddings_shape(&path).unwrap(), (2, 3));
        std::fs::write(&path, b"garbage").unwrap();
        assert!(embeddings_shape(&path).is_err());
    }
}
