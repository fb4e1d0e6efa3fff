//! # Embedding Module
//!
//! Embeddings are dense vector representations of text that capture semantic meaning.
//! The tutor uses them twice: once offline, to turn every textbook chunk into a row of the
//! vector index, and once per request, to place the incoming question in the same space.
//! Both sides must go through the same model, otherwise distances are meaningless.
//!
//! ## Batching
//!
//! [`EmbeddingModel::embed`] always takes a batch. Single queries are a one-item batch
//! ([`EmbeddingModel::embed_one`]). Callers may rely on two things only: the output has one
//! vector per input in the same order, and every vector has [`EmbeddingModel::dim`] entries.
//!
//! ## Normalisation
//!
//! Some providers guarantee unit-length output (sentence-transformers with L2 normalisation,
//! for instance). [`EmbeddingModel::is_normalized`] advertises this so that the retriever can
//! convert squared L2 distances to cosine similarity with `1 - d / 2`. Providers that do not
//! guarantee it must keep the default `false`.

use alloc::vec::Vec;
use core::future::Future;

/// A type alias for an embedding vector of 32-bit floats.
pub type Embedding = Vec<f32>;

/// Converts batches of text to vector representations.
///
/// # Implementation Requirements
///
/// - [`embed`](EmbeddingModel::embed) returns exactly one vector per input, in input order
/// - every vector has length [`dim`](EmbeddingModel::dim)
/// - output is deterministic for a fixed [`model_id`](EmbeddingModel::model_id) and input
///
/// # Example
///
/// ```rust
/// use tutor_core::EmbeddingModel;
///
/// struct Zeros;
///
/// impl EmbeddingModel for Zeros {
///     fn dim(&self) -> usize {
///         384
///     }
///
///     fn model_id(&self) -> &str {
///         "zeros"
///     }
///
///     async fn embed(&self, texts: &[&str]) -> tutor_core::Result<Vec<Vec<f32>>> {
///         Ok(texts.iter().map(|_| vec![0.0; self.dim()]).collect())
///     }
/// }
/// ```
pub trait EmbeddingModel: Send + Sync {
    /// Returns the embedding vector dimension.
    fn dim(&self) -> usize;

    /// Identifier of the underlying model (for example `all-MiniLM-L6-v2`).
    ///
    /// Recorded into persisted indexes so that an index is never queried with a different model.
    fn model_id(&self) -> &str;

    /// Whether every returned vector is guaranteed to have unit L2 norm.
    fn is_normalized(&self) -> bool {
        false
    }

    /// Converts a batch of texts to embedding vectors.
    fn embed(&self, texts: &[&str]) -> impl Future<Output = crate::Result<Vec<Embedding>>> + Send;

    /// Embeds a single text as a one-item batch.
    fn embed_one(&self, text: &str) -> impl Future<Output = crate::Result<Embedding>> + Send {
        async move {
            let batch = [text];
            let mut vectors = self.embed(&batch).await?;
            if vectors.len() != 1 {
                anyhow::bail!(
                    "embedding provider returned {} vectors for a single input",
                    vectors.len()
                );
            }
            Ok(vectors.remove(0))
        }
    }
}
