//! Error type of the tutor orchestrator.

use thiserror::Error;
use tutor_rag::RagError;

/// Errors surfaced by [`Tutor`](crate::Tutor).
///
/// Only construction returns these as `Err`; at request time they are carried inside
/// [`Reply::Failed`](crate::Reply::Failed).
#[derive(Debug, Error)]
pub enum TutorError {
    /// The knowledge base or retrieval stage failed.
    #[error(transparent)]
    Retrieval(#[from] RagError),

    /// The generative model failed.
    #[error(transparent)]
    Generation(anyhow::Error),
}
