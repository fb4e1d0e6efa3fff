//! Google Gemini backend for the textbook tutor.
//!
//! [`GeminiBackend`] implements both traits of `tutor-core`:
//!
//! - [`tutor_core::LanguageModel`] via `generateContent`: the composed tutor prompt goes out as
//!   a single user turn and the first candidate's text comes back.
//! - [`tutor_core::EmbeddingModel`] via `batchEmbedContents`, for deployments without a local
//!   ONNX model.
//!
//! Every request is bounded by a timeout (60 s by default); expiry surfaces as
//! [`GeminiError::Timeout`].
//!
//! # Quick start
//!
//! ```no_run
//! use tutor_core::LanguageModel;
//! use tutor_gemini::GeminiBackend;
//!
//! # async fn run() -> tutor_core::Result<()> {
//! let gemini = GeminiBackend::new(std::env::var("GEMINI_API_KEY")?)
//!     .with_text_model("gemini-1.5-pro");
//! let answer = gemini.complete("Explain Python lists in two sentences.").await?;
//! println!("{answer}");
//! # Ok(()) }
//! ```

mod client;
mod config;
mod embedding;
mod error;
mod llm;
mod types;

pub use config::{
    AuthMode, DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL, DEFAULT_MODEL,
    DEFAULT_TIMEOUT, GEMINI_API_BASE_URL, GeminiBackend,
};
pub use error::GeminiError;
