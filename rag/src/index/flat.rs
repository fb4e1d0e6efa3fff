//! Exhaustive vector index.

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use tutor_core::Embedding;

use crate::error::{RagError, Result};

use super::{Metric, Neighbor};

/// Flat (brute-force) vector index.
///
/// Vectors are stored contiguously in insertion order; position `i` is the `i`-th embedding
/// passed to [`FlatIndex::build`]. The index is immutable once built, so concurrent searches
/// share it without locking.
///
/// Ties in distance are broken by ascending position.
///
/// # Example
///
/// ```rust
/// use tutor_rag::index::FlatIndex;
///
/// let index = FlatIndex::build(2, vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
/// let hits = index.search(&[0.9, 0.1], 1).unwrap();
/// assert_eq!(hits[0].position, 1);
/// ```
#[derive(Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    len: usize,
    vectors: Vec<f32>,
}

impl std::fmt::Debug for FlatIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlatIndex")
            .field("dimension", &self.dimension)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl FlatIndex {
    /// Builds an index over `embeddings`, keeping their order.
    ///
    /// # Errors
    /// [`RagError::DimensionMismatch`] if a vector's length differs from `dimension`, and
    /// [`RagError::IndexAlignment`] if `dimension` is zero.
    pub fn build(dimension: usize, embeddings: Vec<Embedding>) -> Result<Self> {
        if dimension == 0 {
            return Err(RagError::IndexAlignment(
                "embedding dimension must be positive".into(),
            ));
        }
        let len = embeddings.len();
        let mut vectors = Vec::with_capacity(len * dimension);
        for embedding in embeddings {
            if embedding.len() != dimension {
                return Err(RagError::DimensionMismatch {
                    expected: dimension,
                    actual: embedding.len(),
                });
            }
            vectors.extend(embedding);
        }
        Ok(Self {
            dimension,
            len,
            vectors,
        })
    }

    /// Rebuilds an index from its flattened row-major storage.
    ///
    /// # Errors
    /// [`RagError::IndexAlignment`] if the buffer is not a whole number of vectors.
    pub fn from_flat(dimension: usize, vectors: Vec<f32>) -> Result<Self> {
        if dimension == 0 || vectors.len() % dimension != 0 {
            return Err(RagError::IndexAlignment(format!(
                "{} values do not form vectors of dimension {dimension}",
                vectors.len()
            )));
        }
        Ok(Self {
            dimension,
            len: vectors.len() / dimension,
            vectors,
        })
    }

    /// Returns the `top_k` nearest vectors by ascending squared L2 distance.
    ///
    /// Returns every vector when `top_k` exceeds the index size, and nothing for `top_k == 0`.
    ///
    /// # Errors
    /// [`RagError::DimensionMismatch`] if the query has the wrong length.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<Neighbor>> {
        self.search_by(query, top_k, Metric::SquaredL2)
    }

    /// Returns the `top_k` nearest vectors under `metric`, ascending distance.
    ///
    /// # Errors
    /// [`RagError::DimensionMismatch`] if the query has the wrong length.
    pub fn search_by(&self, query: &[f32], top_k: usize, metric: Metric) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if top_k == 0 || self.len == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(OrderedFloat<f32>, usize)> = self
            .vectors
            .par_chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, vector)| (OrderedFloat(metric.distance(query, vector)), position))
            .collect();

        let k = top_k.min(scored.len());
        if k < scored.len() {
            scored.select_nth_unstable(k - 1);
            scored.truncate(k);
        }
        scored.sort_unstable();

        Ok(scored
            .into_iter()
            .map(|(distance, position)| Neighbor {
                position,
                distance: distance.into_inner(),
            })
            .collect())
    }

    /// Flattened row-major storage.
    #[must_use]
    pub fn as_flat(&self) -> &[f32] {
        &self.vectors
    }

    /// Embedding dimension.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the index holds no vectors.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}
