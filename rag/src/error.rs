//! Error types for the RAG crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// The source document or a persisted artifact does not exist.
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The document has no pages, or no extractable text.
    #[error("document has no extractable content: {}", .0.display())]
    EmptyDocument(PathBuf),

    /// The source document could not be parsed.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Chunking operation failed.
    #[error("chunking error: {0}")]
    Chunking(String),

    /// Dimension mismatch between embedding and index.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension provided.
        actual: usize,
    },

    /// The index was built with a different embedding model.
    #[error("embedding model mismatch: index built with `{expected}`, queried with `{actual}`")]
    ModelMismatch {
        /// Model recorded in the index.
        expected: String,
        /// Model of the active embedder.
        actual: String,
    },

    /// Vector positions and chunk positions no longer correspond.
    #[error("index and chunk metadata are misaligned: {0}")]
    IndexAlignment(String),

    /// Embedding operation failed.
    #[error("embedding failed: {0}")]
    Embedding(#[source] anyhow::Error),

    /// Persistence operation failed.
    #[error("persistence error at {path}: {source}")]
    Persistence {
        /// Path where the error occurred.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tutor_pdf::PdfProcessError> for RagError {
    fn from(err: tutor_pdf::PdfProcessError) -> Self {
        match err {
            tutor_pdf::PdfProcessError::NotFound(path) => Self::NotFound(path),
            tutor_pdf::PdfProcessError::Parse(message) => Self::Pdf(message),
            tutor_pdf::PdfProcessError::Io(source) => Self::Io(source),
        }
    }
}

/// Result type alias for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
