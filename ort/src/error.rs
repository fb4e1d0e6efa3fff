//! Failures while loading a sentence-embedding model or running a batch through it.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from [`OrtEmbedding`](crate::OrtEmbedding).
#[derive(Debug, Error)]
pub enum OrtError {
    /// ONNX Runtime rejected the session, an input tensor, or the run itself.
    #[error(transparent)]
    Runtime(#[from] ort::Error),

    /// The builder was finished without a model path.
    #[error("no model path given")]
    MissingModelPath,

    /// No `.onnx` file at the path or inside the model directory.
    #[error("no ONNX model at {0}")]
    ModelNotFound(PathBuf),

    /// No `tokenizer.json` next to the model.
    #[error("no tokenizer.json in {0}")]
    TokenizerNotFound(PathBuf),

    /// `tokenizer.json` exists but could not be loaded or configured for batching.
    #[error("cannot use tokenizer {path}: {reason}")]
    TokenizerLoad {
        /// The tokenizer file.
        path: PathBuf,
        /// Reason reported by `tokenizers`.
        reason: String,
    },

    /// The tokenizer failed on a batch of texts.
    #[error("cannot tokenize a batch of {batch} texts: {reason}")]
    Tokenize {
        /// Texts in the batch.
        batch: usize,
        /// Reason reported by `tokenizers`.
        reason: String,
    },

    /// Rows of a padded batch have different token counts.
    #[error("ragged batch: a row has {actual} tokens, expected {expected}")]
    RaggedBatch {
        /// Token count of the first row.
        expected: usize,
        /// Token count of the offending row.
        actual: usize,
    },

    /// The model produced no token-level hidden states.
    #[error("model output has no hidden states")]
    MissingHiddenState,

    /// Hidden states are not shaped `[batch, tokens, dimension]`.
    #[error("hidden states have {0} axes, expected 3")]
    HiddenStateRank(usize),

    /// No model output declares a usable embedding dimension.
    #[error("cannot infer the embedding dimension from the model outputs")]
    UnknownDimension,

    /// An earlier batch panicked while holding the session.
    #[error("inference session poisoned by an earlier panic")]
    SessionPoisoned,
}
