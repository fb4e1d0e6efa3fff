//! Query-time retrieval: question → page-tagged context.

use std::sync::Arc;

use tutor_core::EmbeddingModel;

use crate::config::RagConfig;
use crate::error::{RagError, Result};
use crate::index::Metric;
use crate::store::KnowledgeBase;
use crate::types::{RETRIEVAL_ERROR_SENTINEL, RetrievedContext, ScoredChunk};

/// Default number of nearest chunks fetched per query.
pub const DEFAULT_TOP_K: usize = 3;
/// Default minimum similarity for a chunk to enter the context.
pub const DEFAULT_MIN_SIMILARITY: f32 = 0.5;

/// Finds the chunks most similar to a question and renders them as prompt context.
///
/// Similarity is `1 - d / 2` over the squared L2 distance `d` when the embedder produces unit
/// vectors. Otherwise the index is ranked by cosine distance directly.
pub struct Retriever<E> {
    embedder: Arc<E>,
    knowledge: Arc<KnowledgeBase>,
    top_k: usize,
    min_similarity: f32,
}

impl<E> std::fmt::Debug for Retriever<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("knowledge", &self.knowledge)
            .field("top_k", &self.top_k)
            .field("min_similarity", &self.min_similarity)
            .finish_non_exhaustive()
    }
}

impl<E: EmbeddingModel> Retriever<E> {
    /// Creates a retriever over `knowledge`.
    ///
    /// # Errors
    /// [`RagError::DimensionMismatch`] or [`RagError::ModelMismatch`] if `embedder` is not the
    /// model the index was built with.
    pub fn new(embedder: Arc<E>, knowledge: Arc<KnowledgeBase>) -> Result<Self> {
        knowledge.ensure_compatible(embedder.as_ref())?;
        Ok(Self {
            embedder,
            knowledge,
            top_k: DEFAULT_TOP_K,
            min_similarity: DEFAULT_MIN_SIMILARITY,
        })
    }

    /// Creates a retriever with the defaults of `config`.
    ///
    /// # Errors
    /// As [`Retriever::new`].
    pub fn from_config(
        embedder: Arc<E>,
        knowledge: Arc<KnowledgeBase>,
        config: &RagConfig,
    ) -> Result<Self> {
        Ok(Self::new(embedder, knowledge)?
            .with_top_k(config.top_k)
            .with_min_similarity(config.min_similarity))
    }

    /// Sets the number of chunks [`Retriever::retrieve`] fetches.
    #[must_use]
    pub const fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Sets the threshold [`Retriever::retrieve`] applies.
    #[must_use]
    pub const fn with_min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    /// The knowledge base searched.
    #[must_use]
    pub const fn knowledge(&self) -> &Arc<KnowledgeBase> {
        &self.knowledge
    }

    /// Returns at most `top_k` chunks with similarity `>= min_similarity`, best first.
    ///
    /// # Errors
    /// [`RagError::Embedding`] if the query cannot be embedded, [`RagError::DimensionMismatch`]
    /// if the provider returns a vector of the wrong length.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        min_similarity: f32,
    ) -> Result<RetrievedContext> {
        let embedding = self
            .embedder
            .embed_one(query)
            .await
            .map_err(RagError::Embedding)?;
        let metric = if self.embedder.is_normalized() {
            Metric::SquaredL2
        } else {
            Metric::Cosine
        };

        let hits: Vec<ScoredChunk> = self
            .knowledge
            .nearest(&embedding, top_k, metric)?
            .into_iter()
            .map(|(neighbor, chunk)| ScoredChunk {
                chunk: chunk.clone(),
                similarity: metric.similarity(neighbor.distance),
            })
            .filter(|hit| hit.similarity >= min_similarity)
            .collect();

        tracing::debug!(
            query,
            top_k,
            min_similarity,
            kept = hits.len(),
            best = hits.first().map(|hit| hit.similarity),
            "retrieved context"
        );
        Ok(RetrievedContext::new(hits))
    }

    /// Renders the context for `query`, never failing.
    ///
    /// Failures are logged and replaced by [`RETRIEVAL_ERROR_SENTINEL`]; an empty result is
    /// [`NO_CONTENT_SENTINEL`](crate::types::NO_CONTENT_SENTINEL).
    pub async fn retrieve_with(&self, query: &str, top_k: usize, min_similarity: f32) -> String {
        match self.search(query, top_k, min_similarity).await {
            Ok(context) => context.render(),
            Err(err) => {
                tracing::error!(error = %err, query, "context retrieval failed");
                RETRIEVAL_ERROR_SENTINEL.to_string()
            }
        }
    }

    /// [`Retriever::retrieve_with`] using the configured `top_k` and threshold.
    pub async fn retrieve(&self, query: &str) -> String {
        self.retrieve_with(query, self.top_k, self.min_similarity)
            .await
    }
}
