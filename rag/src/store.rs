//! The loaded pair of vector index and chunk sequence.

use tutor_core::EmbeddingModel;

use crate::error::{RagError, Result};
use crate::fingerprint::chunk_fingerprint;
use crate::index::{FlatIndex, Metric, Neighbor};
use crate::types::Chunk;

/// A vector index and the chunk sequence it was built from, positionally aligned.
///
/// Position `i` of the index is the embedding of chunk `i`. Construction refuses any pair whose
/// lengths differ, so a `KnowledgeBase` that exists is aligned.
#[derive(Clone)]
pub struct KnowledgeBase {
    index: FlatIndex,
    chunks: Vec<Chunk>,
    model_id: String,
    fingerprint: u64,
}

impl std::fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("index", &self.index)
            .field("chunks", &self.chunks.len())
            .field("model_id", &self.model_id)
            .field("fingerprint", &format_args!("{:016x}", self.fingerprint))
            .finish()
    }
}

impl KnowledgeBase {
    /// Pairs an index with its chunk sequence.
    ///
    /// # Errors
    /// [`RagError::IndexAlignment`] if the index and the chunk sequence differ in length.
    pub fn new(index: FlatIndex, chunks: Vec<Chunk>, model_id: impl Into<String>) -> Result<Self> {
        if index.len() != chunks.len() {
            return Err(RagError::IndexAlignment(format!(
                "{} vectors for {} chunks",
                index.len(),
                chunks.len()
            )));
        }
        let fingerprint = chunk_fingerprint(&chunks);
        Ok(Self {
            index,
            chunks,
            model_id: model_id.into(),
            fingerprint,
        })
    }

    /// Fails unless `embedder` produces vectors compatible with this index.
    ///
    /// # Errors
    /// [`RagError::DimensionMismatch`] or [`RagError::ModelMismatch`].
    pub fn ensure_compatible<E: EmbeddingModel>(&self, embedder: &E) -> Result<()> {
        if embedder.dim() != self.index.dimension() {
            return Err(RagError::DimensionMismatch {
                expected: self.index.dimension(),
                actual: embedder.dim(),
            });
        }
        if embedder.model_id() != self.model_id {
            return Err(RagError::ModelMismatch {
                expected: self.model_id.clone(),
                actual: embedder.model_id().to_string(),
            });
        }
        Ok(())
    }

    /// Nearest chunks to `query` under `metric`, ascending distance.
    ///
    /// # Errors
    /// [`RagError::DimensionMismatch`] if the query has the wrong length.
    pub fn nearest(
        &self,
        query: &[f32],
        top_k: usize,
        metric: Metric,
    ) -> Result<Vec<(Neighbor, &Chunk)>> {
        let neighbors = self.index.search_by(query, top_k, metric)?;
        neighbors
            .into_iter()
            .map(|neighbor| {
                self.chunks
                    .get(neighbor.position)
                    .map(|chunk| (neighbor, chunk))
                    .ok_or_else(|| {
                        RagError::IndexAlignment(format!(
                            "vector {} has no chunk",
                            neighbor.position
                        ))
                    })
            })
            .collect()
    }

    /// The vector index.
    #[must_use]
    pub const fn index(&self) -> &FlatIndex {
        &self.index
    }

    /// The chunk sequence.
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Identifier of the embedding model the index was built with.
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Fingerprint of the chunk sequence.
    #[must_use]
    pub const fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Number of chunks (equal to the number of vectors).
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
