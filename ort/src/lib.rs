//! Local ONNX Runtime sentence embeddings for the textbook tutor.
//!
//! This crate provides [`OrtEmbedding`], an implementation of [`tutor_core::EmbeddingModel`]
//! that runs a sentence-transformers style ONNX export (such as `all-MiniLM-L6-v2`) locally.
//!
//! # Features
//!
//! - **No auto-download**: you provide the model directory
//! - **Batched inference**: inputs are padded to the longest sequence of each batch
//! - **Auto-detect dimension**: embedding dimension is read from the model outputs
//! - **Normalised output**: mean pooling followed by L2 normalisation by default, so the
//!   retriever can use the `1 - d / 2` distance conversion
//!
//! # Example
//!
//! ```rust,no_run
//! use tutor_ort::OrtEmbedding;
//! use tutor_core::EmbeddingModel;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let embedder = OrtEmbedding::from_directory("./models/all-MiniLM-L6-v2")?;
//! assert_eq!(embedder.model_id(), "all-MiniLM-L6-v2");
//!
//! let vectors = embedder.embed(&["What is a list?", "How do loops work?"]).await?;
//! assert_eq!(vectors.len(), 2);
//! # Ok(())
//! # }
//! ```

mod error;
mod pooling;

pub use error::OrtError;
pub use pooling::PoolingStrategy;

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ndarray::{Axis, Ix3};
use ort::session::{Session, SessionInputValue, builder::GraphOptimizationLevel};
use ort::value::Tensor;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tutor_core::{Embedding, EmbeddingModel};

/// Default number of texts per inference call.
pub const DEFAULT_BATCH_SIZE: usize = 32;
/// Default token budget per text; longer inputs are truncated.
pub const DEFAULT_MAX_TOKENS: usize = 256;

/// An embedding model backed by ONNX Runtime.
///
/// ```rust,no_run
/// use tutor_ort::{OrtEmbedding, PoolingStrategy};
///
/// let embedder = OrtEmbedding::builder()
///     .model_path("./model/model.onnx")
///     .tokenizer_path("./model/tokenizer.json")
///     .model_id("all-MiniLM-L6-v2")
///     .pooling(PoolingStrategy::Mean)
///     .build()?;
/// # Ok::<(), tutor_ort::OrtError>(())
/// ```
pub struct OrtEmbedding {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    model_id: String,
    dimension: usize,
    pooling: PoolingStrategy,
    normalize: bool,
    batch_size: usize,
    token_type_ids: bool,
}

impl std::fmt::Debug for OrtEmbedding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtEmbedding")
            .field("model_id", &self.model_id)
            .field("dimension", &self.dimension)
            .field("pooling", &self.pooling)
            .field("normalize", &self.normalize)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl OrtEmbedding {
    /// Load an embedding model from a directory.
    ///
    /// Locates `model.onnx` (or a file in the `onnx/` subdirectory) and `tokenizer.json`.
    /// The directory name becomes the model identifier.
    ///
    /// # Errors
    /// Returns an error if the model or tokenizer cannot be found or loaded.
    pub fn from_directory(path: impl AsRef<Path>) -> Result<Self, OrtError> {
        let dir = path.as_ref();
        let model_path = find_model_file(dir)?;
        let tokenizer_path = find_tokenizer_file(dir)?;

        let mut builder = Self::builder()
            .model_path(model_path)
            .tokenizer_path(tokenizer_path);
        if let Some(name) = dir.file_name().and_then(|name| name.to_str()) {
            builder = builder.model_id(name);
        }
        builder.build()
    }

    /// Create a builder for custom configuration.
    #[must_use]
    pub fn builder() -> OrtEmbeddingBuilder {
        OrtEmbeddingBuilder::default()
    }

    /// Returns the pooling strategy.
    #[must_use]
    pub const fn pooling(&self) -> PoolingStrategy {
        self.pooling
    }

    /// Returns the number of texts per inference call.
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, OrtError> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| OrtError::Tokenize {
                batch: texts.len(),
                reason: e.to_string(),
            })?;

        let batch = encodings.len();
        let seq_len = encodings.first().map_or(0, |e| e.get_ids().len());

        let mut input_ids = Vec::with_capacity(batch * seq_len);
        let mut attention_mask = Vec::with_capacity(batch * seq_len);
        let mut type_ids = Vec::with_capacity(batch * seq_len);
        for encoding in &encodings {
            if encoding.get_ids().len() != seq_len {
                return Err(OrtError::RaggedBatch {
                    expected: seq_len,
                    actual: encoding.get_ids().len(),
                });
            }
            input_ids.extend(encoding.get_ids().iter().map(|&id| i64::from(id)));
            attention_mask.extend(encoding.get_attention_mask().iter().map(|&m| i64::from(m)));
            type_ids.extend(encoding.get_type_ids().iter().map(|&t| i64::from(t)));
        }

        let mut inputs: Vec<(Cow<'_, str>, SessionInputValue<'_>)> = vec![
            (
                Cow::from("input_ids"),
                Tensor::from_array(([batch, seq_len], input_ids.into_boxed_slice()))?.into(),
            ),
            (
                Cow::from("attention_mask"),
                Tensor::from_array(([batch, seq_len], attention_mask.into_boxed_slice()))?.into(),
            ),
        ];
        if self.token_type_ids {
            inputs.push((
                Cow::from("token_type_ids"),
                Tensor::from_array(([batch, seq_len], type_ids.into_boxed_slice()))?.into(),
            ));
        }

        // Extract to an owned array before releasing the session lock.
        let hidden_states = {
            let mut session = self.session.lock().map_err(|_| OrtError::SessionPoisoned)?;
            let outputs = session.run(inputs)?;

            let hidden_states = outputs
                .get("last_hidden_state")
                .or_else(|| outputs.get("hidden_states"))
                .or_else(|| outputs.get("output"))
                .ok_or(OrtError::MissingHiddenState)?;

            hidden_states.try_extract_array::<f32>()?.to_owned()
        };

        let rank = hidden_states.ndim();
        let hidden_states = hidden_states
            .into_dimensionality::<Ix3>()
            .map_err(|_| OrtError::HiddenStateRank(rank))?;

        let embeddings = encodings
            .iter()
            .enumerate()
            .map(|(row, encoding)| {
                let mut embedding = self.pooling.apply(
                    &hidden_states.index_axis(Axis(0), row),
                    encoding.get_attention_mask(),
                );
                if self.normalize {
                    l2_normalize(&mut embedding);
                }
                embedding
            })
            .collect();

        Ok(embeddings)
    }
}

impl EmbeddingModel for OrtEmbedding {
    fn dim(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn is_normalized(&self) -> bool {
        self.normalize
    }

    async fn embed(&self, texts: &[&str]) -> tutor_core::Result<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            tracing::debug!(batch = batch.len(), model = %self.model_id, "running onnx embedding batch");
            embeddings.extend(self.embed_batch(batch)?);
        }
        Ok(embeddings)
    }
}

/// Builder for [`OrtEmbedding`].
#[derive(Debug)]
pub struct OrtEmbeddingBuilder {
    model_path: Option<PathBuf>,
    tokenizer_path: Option<PathBuf>,
    model_id: Option<String>,
    pooling: PoolingStrategy,
    normalize: bool,
    batch_size: usize,
    max_tokens: usize,
}

impl Default for OrtEmbeddingBuilder {
    fn default() -> Self {
        Self {
            model_path: None,
            tokenizer_path: None,
            model_id: None,
            pooling: PoolingStrategy::default(),
            normalize: true,
            batch_size: DEFAULT_BATCH_SIZE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl OrtEmbeddingBuilder {
    /// Set the path to the ONNX model file.
    #[must_use]
    pub fn model_path(mut self, path: impl AsRef<Path>) -> Self {
        self.model_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the path to the tokenizer.json file.
    #[must_use]
    pub fn tokenizer_path(mut self, path: impl AsRef<Path>) -> Self {
        self.tokenizer_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the identifier recorded into indexes built with this model.
    ///
    /// Default: the model file stem.
    #[must_use]
    pub fn model_id(mut self, id: impl Into<String>) -> Self {
        self.model_id = Some(id.into());
        self
    }

    /// Set the pooling strategy.
    ///
    /// Default: [`PoolingStrategy::Mean`]
    #[must_use]
    pub const fn pooling(mut self, strategy: PoolingStrategy) -> Self {
        self.pooling = strategy;
        self
    }

    /// Enable or disable L2 normalization.
    ///
    /// Default: `true`
    #[must_use]
    pub const fn normalize(mut self, enabled: bool) -> Self {
        self.normalize = enabled;
        self
    }

    /// Set how many texts go through one inference call. Zero is treated as one.
    #[must_use]
    pub const fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = if size == 0 { 1 } else { size };
        self
    }

    /// Set the maximum number of tokens per text.
    #[must_use]
    pub const fn max_tokens(mut self, tokens: usize) -> Self {
        self.max_tokens = tokens;
        self
    }

    /// Build the [`OrtEmbedding`] instance.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Model path is not specified
    /// - Model file cannot be loaded
    /// - Tokenizer file cannot be loaded or configured
    /// - Model output dimension cannot be determined
    pub fn build(self) -> Result<OrtEmbedding, OrtError> {
        let model_path = self.model_path.ok_or(OrtError::MissingModelPath)?;

        if !model_path.exists() {
            return Err(OrtError::ModelNotFound(model_path));
        }

        let tokenizer_path = self.tokenizer_path.ok_or_else(|| {
            OrtError::TokenizerNotFound(model_path.parent().unwrap_or(&model_path).to_path_buf())
        })?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| OrtError::TokenizerLoad {
                path: tokenizer_path.clone(),
                reason: e.to_string(),
            })?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..PaddingParams::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: self.max_tokens,
                ..TruncationParams::default()
            }))
            .map_err(|e| OrtError::TokenizerLoad {
                path: tokenizer_path.clone(),
                reason: e.to_string(),
            })?;

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(num_cpus())?
            .commit_from_file(&model_path)?;

        let dimension = detect_embedding_dimension(&session)?;
        let token_type_ids = session
            .inputs()
            .iter()
            .any(|input| input.name() == "token_type_ids");

        let model_id = self.model_id.unwrap_or_else(|| {
            model_path
                .file_stem()
                .map_or_else(|| "onnx".to_string(), |s| s.to_string_lossy().into_owned())
        });

        tracing::info!(
            model = %model_id,
            dimension,
            path = %model_path.display(),
            "loaded onnx embedding model"
        );

        Ok(OrtEmbedding {
            session: Mutex::new(session),
            tokenizer,
            model_id,
            dimension,
            pooling: self.pooling,
            normalize: self.normalize,
            batch_size: self.batch_size,
            token_type_ids,
        })
    }
}

/// L2 normalize a vector in place.
fn l2_normalize(vec: &mut [f32]) {
    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vec.iter_mut() {
            *v /= norm;
        }
    }
}

/// Find the ONNX model file in a directory.
fn find_model_file(dir: &Path) -> Result<PathBuf, OrtError> {
    let candidates = [
        dir.join("model.onnx"),
        dir.join("onnx/model.onnx"),
        dir.join("onnx/model_fp32.onnx"),
        dir.join("onnx/model_quantized.onnx"),
    ];

    if let Some(found) = candidates.iter().find(|candidate| candidate.exists()) {
        return Ok(found.clone());
    }

    for search_dir in [dir.to_path_buf(), dir.join("onnx")] {
        if let Some(path) = first_onnx_file(&search_dir) {
            return Ok(path);
        }
    }

    Err(OrtError::ModelNotFound(dir.to_path_buf()))
}

fn first_onnx_file(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut found: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "onnx"))
        .collect();
    found.sort();
    found.into_iter().next()
}

/// Find the tokenizer.json file in a directory.
fn find_tokenizer_file(dir: &Path) -> Result<PathBuf, OrtError> {
    let candidates = [dir.join("tokenizer.json"), dir.join("onnx/tokenizer.json")];

    candidates
        .into_iter()
        .find(|candidate| candidate.exists())
        .ok_or_else(|| OrtError::TokenizerNotFound(dir.to_path_buf()))
}

/// Detect the embedding dimension from model output metadata.
fn detect_embedding_dimension(session: &Session) -> Result<usize, OrtError> {
    for output in session.outputs() {
        // Expect shape [batch, seq_len, hidden_dim] or [batch, hidden_dim]
        if let ort::value::ValueType::Tensor { shape, .. } = output.dtype() {
            if shape.len() >= 2 {
                if let Some(&dim) = shape.last() {
                    if dim > 0 {
                        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                        return Ok(dim as usize);
                    }
                }
            }
        }
    }

    Err(OrtError::UnknownDimension)
}

/// Get number of CPU cores for parallelism.
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZero::get)
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_model_path() {
        let result = OrtEmbeddingBuilder::default().build();
        assert!(matches!(result, Err(OrtError::MissingModelPath)));
    }

    #[test]
    fn builder_validates_model_exists() {
        let result = OrtEmbeddingBuilder::default()
            .model_path("/nonexistent/model.onnx")
            .tokenizer_path("/nonexistent/tokenizer.json")
            .build();
        assert!(matches!(result, Err(OrtError::ModelNotFound(_))));
    }

    #[test]
    fn builder_defaults_suit_sentence_transformers() {
        let builder = OrtEmbeddingBuilder::default();
        assert_eq!(builder.pooling, PoolingStrategy::Mean);
        assert!(builder.normalize);
        assert_eq!(builder.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(OrtEmbeddingBuilder::default().batch_size(0).batch_size, 1);
    }

    #[test]
    fn missing_directory_reports_model_not_found() {
        let result = OrtEmbedding::from_directory("/nonexistent/all-MiniLM-L6-v2");
        assert!(matches!(result, Err(OrtError::ModelNotFound(_))));
    }

    #[test]
    fn l2_normalize_works() {
        let mut vec = vec![3.0, 4.0];
        l2_normalize(&mut vec);
        assert!((vec[0] - 0.6).abs() < 1e-6);
        assert!((vec[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn l2_normalize_zero_vector() {
        let mut vec = vec![0.0, 0.0];
        l2_normalize(&mut vec);
        assert_eq!(vec, vec![0.0, 0.0]);
    }
}
