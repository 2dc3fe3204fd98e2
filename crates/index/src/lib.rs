//! In-memory vector index for k-nearest-neighbor retrieval.
//!
//! Stores `(embedding, metadata)` pairs and answers top-k queries by cosine
//! similarity. Two search paths share one API:
//!
//! - **HNSW** (`hnsw_rs`) above a configurable dataset-size threshold, for
//!   sub-linear approximate search.
//! - **Exact linear scan** below the threshold, where brute force is both
//!   faster to set up and exact.
//!
//! Both return cosine similarity in `[-1, 1]`, higher meaning closer, sorted
//! in non-increasing order.
//!
//! ## Rebuild discipline
//!
//! The index is designed for wholesale rebuilds: `clear` → `upsert_batch` →
//! `build` → queries. `build` must complete before the first query against
//! the current batch; querying an index with un-built pending upserts returns
//! [`IndexError::NotBuilt`]. This keeps the build/query ordering an explicit
//! precondition rather than a best-effort convention.

use hnsw_rs::prelude::*;
use thiserror::Error;
use tracing::debug;

/// Configuration for index construction and search.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Number of neighbors per HNSW node (higher = better recall, slower build).
    pub m: usize,
    /// Candidate-list size during construction.
    pub ef_construction: usize,
    /// Candidate-list size during search.
    pub ef_search: usize,
    /// Minimum number of vectors before HNSW is used; below this the exact
    /// linear scan runs even when `ann_enabled` is true.
    pub min_vectors_for_ann: usize,
    /// Whether HNSW is used at all.
    pub ann_enabled: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construction: 200,
            ef_search: 50,
            min_vectors_for_ann: 1000,
            ann_enabled: true,
        }
    }
}

impl IndexConfig {
    pub fn with_m(mut self, m: usize) -> Self {
        self.m = m;
        self
    }

    pub fn with_ef_construction(mut self, ef: usize) -> Self {
        self.ef_construction = ef;
        self
    }

    pub fn with_ef_search(mut self, ef: usize) -> Self {
        self.ef_search = ef;
        self
    }

    pub fn with_min_vectors_for_ann(mut self, min: usize) -> Self {
        self.min_vectors_for_ann = min;
        self
    }

    pub fn with_ann_enabled(mut self, enabled: bool) -> Self {
        self.ann_enabled = enabled;
        self
    }

    /// Whether HNSW should serve queries for the given dataset size.
    pub fn should_use_ann(&self, num_vectors: usize) -> bool {
        self.ann_enabled && num_vectors >= self.min_vectors_for_ann
    }
}

/// One stored entry: an embedding plus caller-defined metadata.
#[derive(Debug, Clone)]
pub struct IndexEntry<M> {
    pub vector: Vec<f32>,
    pub metadata: M,
}

/// One query hit. `score` is cosine similarity, higher is closer.
#[derive(Debug, Clone)]
pub struct Neighbor<M> {
    pub score: f32,
    pub metadata: M,
}

/// Errors raised by index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("index has pending upserts; call build() before querying")]
    NotBuilt,
}

/// The vector index. Generic over the metadata carried per entry.
pub struct VectorIndex<M> {
    cfg: IndexConfig,
    dimension: usize,
    entries: Vec<IndexEntry<M>>,
    hnsw: Option<Hnsw<'static, f32, DistCosine>>,
    built: bool,
}

impl<M: Clone> VectorIndex<M> {
    /// Create an empty index for vectors of the given dimension.
    pub fn new(dimension: usize, cfg: IndexConfig) -> Self {
        Self {
            cfg,
            dimension,
            entries: Vec::new(),
            hnsw: None,
            built: false,
        }
    }

    /// Insert a batch of entries. Invalidates any previous `build`.
    pub fn upsert_batch(&mut self, entries: Vec<IndexEntry<M>>) -> Result<(), IndexError> {
        for entry in &entries {
            if entry.vector.len() != self.dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: self.dimension,
                    got: entry.vector.len(),
                });
            }
        }
        self.entries.extend(entries);
        self.built = false;
        Ok(())
    }

    /// Drop all entries. The next fold starts from an empty index.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hnsw = None;
        self.built = false;
    }

    /// Settle pending upserts so queries may run.
    ///
    /// Constructs the HNSW graph when the dataset is large enough for it;
    /// otherwise just marks the linear path ready.
    pub fn build(&mut self) {
        self.hnsw = None;

        let nb_elem = self.entries.len();
        // HNSW degenerates on tiny datasets; the linear path covers them.
        if nb_elem >= 10 && self.cfg.should_use_ann(nb_elem) {
            let nb_layer = 16.min((nb_elem as f32).ln().trunc() as usize);
            let hnsw = Hnsw::<f32, DistCosine>::new(
                self.cfg.m,
                nb_elem,
                nb_layer,
                self.cfg.ef_construction,
                DistCosine {},
            );
            let data_for_insertion: Vec<(&Vec<f32>, usize)> = self
                .entries
                .iter()
                .enumerate()
                .map(|(idx, entry)| (&entry.vector, idx))
                .collect();
            hnsw.parallel_insert(&data_for_insertion);
            self.hnsw = Some(hnsw);
        }

        self.built = true;
        debug!(
            entries = nb_elem,
            hnsw = self.hnsw.is_some(),
            "index built"
        );
    }

    /// Top-k query by cosine similarity, sorted non-increasing, length ≤ k.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor<M>>, IndexError> {
        if !self.built {
            return Err(IndexError::NotBuilt);
        }
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                got: vector.len(),
            });
        }
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(ref hnsw) = self.hnsw {
            let results: Vec<Neighbour> = hnsw.search(vector, k, self.cfg.ef_search);
            let mut neighbors: Vec<Neighbor<M>> = results
                .into_iter()
                .map(|n| Neighbor {
                    // DistCosine yields 1 - cos; map back to similarity.
                    score: 1.0 - n.distance,
                    metadata: self.entries[n.get_origin_id()].metadata.clone(),
                })
                .collect();
            neighbors.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            neighbors.truncate(k);
            Ok(neighbors)
        } else {
            self.linear_query(vector, k)
        }
    }

    fn linear_query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor<M>>, IndexError> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (idx, cosine_similarity(vector, &entry.vector)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(idx, score)| Neighbor {
                score,
                metadata: self.entries[idx].metadata.clone(),
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn config(&self) -> &IndexConfig {
        &self.cfg
    }
}

/// Cosine similarity in `[-1, 1]`. Zero-norm inputs score 0 against
/// everything, so a sentinel zero vector never matches.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
