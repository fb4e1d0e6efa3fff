//! # tutor-core
//!
//! `tutor-core` hosts the no-std trait APIs the rest of the workspace is written against.
//! The retrieval pipeline only ever talks to these traits, so the local ONNX embedder, the
//! Gemini backend, and the test doubles in every crate are interchangeable.
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌──────────────────┐
//! │   tutor-rag     │───▶│   tutor-core     │◀───│   Providers      │
//! │                 │    │   (this crate)   │    │                  │
//! │ - Index builder │    │                  │    │ - tutor-ort      │
//! │ - Retriever     │    │ - EmbeddingModel │    │ - tutor-gemini   │
//! │ - Relevance gate│    │ - LanguageModel  │    │                  │
//! └─────────────────┘    └──────────────────┘    └──────────────────┘
//! ```
//!
//! | Capability | Trait | Description |
//! |------------|-------|-------------|
//! | **Embeddings** | [`EmbeddingModel`] | Batched text → fixed-dimension vectors |
//! | **Completion** | [`LanguageModel`] | Fully-formed prompt → generated text |
//!
//! ## Example
//!
//! ```rust
//! use tutor_core::{EmbeddingModel, LanguageModel};
//!
//! async fn ground<E: EmbeddingModel, L: LanguageModel>(
//!     embedder: &E,
//!     model: &L,
//!     question: &str,
//! ) -> tutor_core::Result {
//!     let query = embedder.embed_one(question).await?;
//!     assert_eq!(query.len(), embedder.dim());
//!     model.complete(question).await
//! }
//! ```

#![no_std]
extern crate alloc;

/// Text embeddings.
///
/// Contains the [`EmbeddingModel`] trait and the [`Embedding`](embedding::Embedding) alias.
pub mod embedding;
/// Text completion against an opaque generative service.
pub mod llm;

use alloc::string::String;

#[doc(inline)]
pub use embedding::{Embedding, EmbeddingModel};
#[doc(inline)]
pub use llm::LanguageModel;

/// Result type used throughout the crate.
///
/// Type alias for [`anyhow::Result<T>`](anyhow::Result) with [`String`] as default success type.
pub type Result<T = String> = anyhow::Result<T>;

pub use anyhow::Error;
