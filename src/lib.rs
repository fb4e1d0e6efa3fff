//! # tutor
//!
//! A textbook tutor built on retrieval-augmented generation. The offline half turns a PDF into a
//! knowledge base ([`rag::IndexBuilder`], [`rag::ArtifactStore`]); the online half is the
//! [`Tutor`], which grounds every answer in the textbook pages most similar to the question.
//!
//! ## What's inside?
//!
//! - [`Tutor`] and [`Reply`]: identity short-circuit, optional domain gating, retrieval, prompt
//!   composition and generation, with no error escaping [`Tutor::answer`].
//! - [`EmbeddingModel`] and [`LanguageModel`] from `tutor-core`, so any provider plugs in.
//! - The retrieval pipeline as [`rag`], and the providers behind feature flags: `ort` (local ONNX
//!   embeddings), `gemini` (Gemini completions and embeddings), `pdf-process` (PDF parsing).
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tutor::{Tutor, rag::ArtifactStore};
//!
//! async fn ask<E: tutor::EmbeddingModel, L: tutor::LanguageModel>(
//!     embedder: E,
//!     model: L,
//! ) -> Result<String, tutor::TutorError> {
//!     let embedder = Arc::new(embedder);
//!     let knowledge = ArtifactStore::new("output/textbook_index.rkyv", "output/text_chunks.json")
//!         .load(embedder.as_ref())?;
//!     let tutor = Tutor::builder(embedder, Arc::new(knowledge), Arc::new(model)).build()?;
//!     Ok(tutor.answer("How do I slice a string?").await)
//! }
//! ```

mod error;
mod tutor;

pub use error::TutorError;
pub use tutor::{
    DomainPolicy, IDENTITY_REPLY, OUT_OF_SCOPE_REPLY, Reply, Tutor, TutorBuilder,
};
pub use tutor_core::*;
pub use tutor_rag as rag;

#[cfg(feature = "gemini")]
pub use tutor_gemini as gemini;
#[cfg(feature = "ort")]
pub use tutor_ort as ort;
#[cfg(feature = "pdf-process")]
pub use tutor_pdf as pdf;
