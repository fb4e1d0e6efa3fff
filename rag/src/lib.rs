//! Retrieval pipeline for the textbook tutor.
//!
//! This crate turns a PDF into a searchable knowledge base and answers "which passages matter for
//! this question" at query time. It is generic over any
//! [`EmbeddingModel`](tutor_core::EmbeddingModel), so the same code runs against a local ONNX
//! model, a hosted embedding API, or a test double.
//!
//! # Pipeline
//!
//! ```text
//! ingest:  PDF ──▶ chunking::extract ──▶ IndexBuilder ──▶ KnowledgeBase ──▶ ArtifactStore::save
//! query:   ArtifactStore::load ──▶ RelevanceGate / Retriever ──▶ PromptComposer
//! ```
//!
//! - [`chunking`]: page-tagged chunks of at most `max_chunk_size` characters
//! - [`IndexBuilder`]: embeds every chunk in one batch and builds a [`FlatIndex`]
//! - [`ArtifactStore`]: the vector artifact (rkyv) and chunk artifact (JSON), verified as a pair
//! - [`RelevanceGate`]: keyword OR centroid similarity, memoised in a bounded LRU cache
//! - [`Retriever`]: nearest chunks above a similarity threshold, rendered with page tags
//! - [`PromptComposer`]: the tutor prompt template
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tutor_rag::{ArtifactStore, PromptComposer, RagConfig, Retriever};
//!
//! # async fn run<E: tutor_core::EmbeddingModel>(embedder: E) -> tutor_rag::Result<()> {
//! let config = RagConfig::default();
//! let embedder = Arc::new(embedder);
//! let knowledge = Arc::new(ArtifactStore::from_config(&config).load(embedder.as_ref())?);
//!
//! let retriever = Retriever::from_config(embedder, knowledge, &config)?;
//! let context = retriever.retrieve("How do I slice a string?").await;
//! let prompt = PromptComposer.compose("How do I slice a string?", &context);
//! # let _ = prompt;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod chunking;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod gate;
pub mod index;
pub mod persistence;
pub mod prompt;
pub mod retriever;
pub mod store;
pub mod types;

#[cfg(test)]
mod test_support;

pub use builder::{IndexBuilder, IndexProgress, IndexStage};
pub use chunking::{Chunker, FixedSizeChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use error::{RagError, Result};
pub use gate::{DEFAULT_KEYWORDS, RelevanceGate};
pub use index::{FlatIndex, Metric, Neighbor};
pub use persistence::{ArtifactStore, Persistence};
pub use prompt::PromptComposer;
pub use retriever::{DEFAULT_MIN_SIMILARITY, DEFAULT_TOP_K, Retriever};
pub use store::KnowledgeBase;
pub use types::{
    CONTEXT_SEPARATOR, Chunk, NO_CONTENT_SENTINEL, RETRIEVAL_ERROR_SENTINEL, RetrievedContext,
    ScoredChunk,
};
