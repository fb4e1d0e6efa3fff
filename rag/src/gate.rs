//! Domain relevance gate.
//!
//! Decides whether a question belongs to the textbook's domain from two signals, OR-combined:
//! a case-insensitive substring match against a keyword vocabulary, and the cosine similarity
//! between the question embedding and the centroid of the keyword embeddings.

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_lock::OnceCell;
use lru::LruCache;
use parking_lot::Mutex;
use tutor_core::{Embedding, EmbeddingModel};

use crate::config::RagConfig;
use crate::error::{RagError, Result};
use crate::index::cosine_similarity;

/// Vocabulary of the bundled Python-programming textbook.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "python",
    "list",
    "dict",
    "function",
    "loop",
    "variable",
    "string",
    "class",
    "import",
    "lambda",
    "def",
    "tuple",
    "set",
    "int",
    "float",
    "bool",
    "syntax",
    "error",
    "numbers",
    "numeric",
    "arithmetic",
    "types",
    "math",
    "operators",
    "if",
    "elif",
    "else",
    "while",
    "for",
    "break",
    "continue",
    "input",
    "print",
    "type",
    "conversion",
    "indexing",
    "slicing",
    "concatenation",
    "password",
];

/// Classifies questions as in-domain or out-of-domain.
///
/// Verdicts are memoised per exact query text in a bounded LRU cache owned by the gate. Failed
/// checks are not remembered.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use tutor_rag::RelevanceGate;
///
/// # async fn check<E: tutor_core::EmbeddingModel>(embedder: Arc<E>) -> tutor_rag::Result<()> {
/// let gate = RelevanceGate::new(embedder).with_threshold(0.75);
/// assert!(gate.is_in_domain("what is a python list").await?);
/// # Ok(())
/// # }
/// ```
pub struct RelevanceGate<E> {
    embedder: Arc<E>,
    keywords: Vec<String>,
    threshold: f32,
    centroid: OnceCell<Embedding>,
    cache: Mutex<LruCache<String, bool>>,
}

impl<E> std::fmt::Debug for RelevanceGate<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelevanceGate")
            .field("keywords", &self.keywords.len())
            .field("threshold", &self.threshold)
            .field("centroid_ready", &self.centroid.is_initialized())
            .field("cached", &self.cache.lock().len())
            .finish_non_exhaustive()
    }
}

impl<E: EmbeddingModel> RelevanceGate<E> {
    /// Creates a gate with the default vocabulary, threshold and cache capacity.
    #[must_use]
    pub fn new(embedder: Arc<E>) -> Self {
        Self::from_config(embedder, &RagConfig::default())
    }

    /// Creates a gate with the threshold and cache capacity of `config`.
    #[must_use]
    pub fn from_config(embedder: Arc<E>, config: &RagConfig) -> Self {
        Self {
            embedder,
            keywords: DEFAULT_KEYWORDS.iter().map(|k| (*k).to_string()).collect(),
            threshold: config.gate_threshold,
            centroid: OnceCell::new(),
            cache: Mutex::new(LruCache::new(capacity(config.gate_cache_capacity))),
        }
    }

    /// Replaces the vocabulary. Keywords are matched case-insensitively.
    #[must_use]
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        self.centroid = OnceCell::new();
        self.cache.get_mut().clear();
        self
    }

    /// Sets the semantic similarity threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self.cache.get_mut().clear();
        self
    }

    /// Sets how many distinct queries are remembered. Zero is treated as one.
    #[must_use]
    pub fn with_cache_capacity(mut self, entries: usize) -> Self {
        self.cache.get_mut().resize(capacity(entries));
        self
    }

    /// The vocabulary, lower-cased.
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// The semantic similarity threshold.
    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Number of remembered verdicts.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.lock().len()
    }

    /// Returns `true` if the lower-cased query contains any keyword.
    #[must_use]
    pub fn matches_keyword(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.keywords.iter().any(|k| query.contains(k.as_str()))
    }

    /// Decides whether `query` is in the textbook's domain.
    ///
    /// The query is only embedded when the keyword match fails.
    ///
    /// # Errors
    /// [`RagError::Embedding`] if the provider fails, [`RagError::DimensionMismatch`] if it
    /// returns vectors of inconsistent length.
    pub async fn is_in_domain(&self, query: &str) -> Result<bool> {
        let cached = self.cache.lock().get(query).copied();
        if let Some(verdict) = cached {
            tracing::debug!(query, verdict, "relevance gate cache hit");
            return Ok(verdict);
        }

        let verdict = if self.matches_keyword(query) {
            true
        } else {
            self.semantic_match(query).await?
        };

        self.cache.lock().put(query.to_owned(), verdict);
        tracing::debug!(query, verdict, "relevance gate verdict");
        Ok(verdict)
    }

    async fn semantic_match(&self, query: &str) -> Result<bool> {
        if self.keywords.is_empty() {
            return Ok(false);
        }
        let centroid = self.centroid().await?;
        let embedding = self
            .embedder
            .embed_one(query)
            .await
            .map_err(RagError::Embedding)?;
        if embedding.len() != centroid.len() {
            return Err(RagError::DimensionMismatch {
                expected: centroid.len(),
                actual: embedding.len(),
            });
        }
        let similarity = cosine_similarity(&embedding, centroid);
        tracing::debug!(query, similarity, threshold = self.threshold, "semantic gate score");
        Ok(similarity > self.threshold)
    }

    async fn centroid(&self) -> Result<&Embedding> {
        self.centroid
            .get_or_try_init(|| async {
                let keywords: Vec<&str> = self.keywords.iter().map(String::as_str).collect();
                let vectors = self
                    .embedder
                    .embed(&keywords)
                    .await
                    .map_err(RagError::Embedding)?;
                let centroid = mean(&vectors, self.embedder.dim())?;
                tracing::debug!(keywords = keywords.len(), "computed keyword centroid");
                Ok::<_, RagError>(centroid)
            })
            .await
    }
}

fn capacity(requested: usize) -> NonZeroUsize {
    NonZeroUsize::new(requested).unwrap_or(NonZeroUsize::MIN)
}

#[allow(clippy::cast_precision_loss)]
fn mean(vectors: &[Embedding], dimension: usize) -> Result<Embedding> {
    let mut sum = vec![0.0f32; dimension];
    for vector in vectors {
        if vector.len() != dimension {
            return Err(RagError::DimensionMismatch {
                expected: dimension,
                actual: vector.len(),
            });
        }
        for (acc, value) in sum.iter_mut().zip(vector) {
            *acc += value;
        }
    }
    if !vectors.is_empty() {
        let count = vectors.len() as f32;
        sum.iter_mut().for_each(|v| *v /= count);
    }
    Ok(sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TableEmbedding;

    fn embedder() -> Arc<TableEmbedding> {
        Arc::new(
            TableEmbedding::new(2)
                .with_fallback(vec![1.0, 0.0])
                .with("best pancake recipe", vec![0.0, 1.0])
                .with("how do closures capture", vec![0.9, 0.1]),
        )
    }

    #[tokio::test]
    async fn keyword_match_skips_embedding() {
        let embedder = embedder();
        let gate = RelevanceGate::new(embedder.clone());

        assert!(gate.is_in_domain("what is a python list").await.unwrap());
        assert!(gate.is_in_domain("What Is A PYTHON List").await.unwrap());
        assert_eq!(embedder.calls(), 0);
    }

    #[tokio::test]
    async fn keyword_match_wins_even_with_failing_embedder() {
        let gate = RelevanceGate::new(Arc::new(TableEmbedding::new(2).failing()));
        assert!(gate.is_in_domain("what is a python list").await.unwrap());
    }

    #[tokio::test]
    async fn semantic_signal_decides_without_keywords() {
        let gate = RelevanceGate::new(embedder());

        assert!(gate.is_in_domain("how do closures capture").await.unwrap());
        assert!(!gate.is_in_domain("best pancake recipe").await.unwrap());
    }

    #[tokio::test]
    async fn threshold_is_strict() {
        let gate = RelevanceGate::new(embedder()).with_threshold(1.0);
        assert!(!gate.is_in_domain("weather tomorrow").await.unwrap());
    }

    #[tokio::test]
    async fn repeated_queries_are_memoised() {
        let embedder = embedder();
        let gate = RelevanceGate::new(embedder.clone());

        assert!(!gate.is_in_domain("best pancake recipe").await.unwrap());
        let after_first = embedder.calls();
        assert_eq!(after_first, 2, "keyword centroid and the query");

        assert!(!gate.is_in_domain("best pancake recipe").await.unwrap());
        assert_eq!(embedder.calls(), after_first);
        assert_eq!(gate.cached(), 1);
    }

    #[tokio::test]
    async fn centroid_is_computed_once() {
        let embedder = embedder();
        let gate = RelevanceGate::new(embedder.clone());

        gate.is_in_domain("best pancake recipe").await.unwrap();
        gate.is_in_domain("weather tomorrow").await.unwrap();
        assert_eq!(embedder.calls(), 3);
        assert_eq!(embedder.texts_embedded(), DEFAULT_KEYWORDS.len() + 2);
    }

    #[tokio::test]
    async fn least_recently_used_verdict_is_evicted() {
        let embedder = embedder();
        let gate = RelevanceGate::new(embedder.clone()).with_cache_capacity(1);

        gate.is_in_domain("best pancake recipe").await.unwrap();
        gate.is_in_domain("weather tomorrow").await.unwrap();
        let before = embedder.calls();

        gate.is_in_domain("best pancake recipe").await.unwrap();
        assert_eq!(embedder.calls(), before + 1);
        assert_eq!(gate.cached(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let embedder = Arc::new(TableEmbedding::new(2).failing());
        let gate = RelevanceGate::new(embedder.clone());

        assert!(gate.is_in_domain("weather tomorrow").await.is_err());
        assert!(gate.is_in_domain("weather tomorrow").await.is_err());
        assert_eq!(gate.cached(), 0);
        assert_eq!(embedder.calls(), 2);
    }

    #[tokio::test]
    async fn custom_vocabulary() {
        let gate = RelevanceGate::new(embedder()).with_keywords(["Photosynthesis"]);

        assert!(gate.matches_keyword("explain photosynthesis"));
        assert!(!gate.matches_keyword("what is a python list"));
        assert_eq!(gate.keywords(), ["photosynthesis"]);
    }

    #[tokio::test]
    async fn empty_vocabulary_rejects_without_embedding() {
        let embedder = embedder();
        let gate = RelevanceGate::new(embedder.clone()).with_keywords(Vec::<String>::new());

        assert!(!gate.is_in_domain("how do closures capture").await.unwrap());
        assert_eq!(embedder.calls(), 0);
    }
}
