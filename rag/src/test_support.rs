//! Deterministic embedders shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use tutor_core::{Embedding, EmbeddingModel};

/// Looks texts up in a fixed table; unknown texts embed to the fallback vector.
pub struct TableEmbedding {
    dimension: usize,
    model_id: String,
    entries: HashMap<String, Embedding>,
    fallback: Embedding,
    normalized: bool,
    failing: bool,
    calls: AtomicUsize,
    texts: AtomicUsize,
}

impl TableEmbedding {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            model_id: "table".into(),
            entries: HashMap::new(),
            fallback: vec![0.0; dimension],
            normalized: true,
            failing: false,
            calls: AtomicUsize::new(0),
            texts: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, text: &str, vector: Embedding) -> Self {
        assert_eq!(vector.len(), self.dimension);
        self.entries.insert(text.to_owned(), vector);
        self
    }

    pub fn with_fallback(mut self, vector: Embedding) -> Self {
        assert_eq!(vector.len(), self.dimension);
        self.fallback = vector;
        self
    }

    pub fn with_model_id(mut self, id: &str) -> Self {
        self.model_id = id.to_owned();
        self
    }

    pub const fn unnormalized(mut self) -> Self {
        self.normalized = false;
        self
    }

    pub const fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Number of `embed` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of texts embedded so far, across all calls.
    pub fn texts_embedded(&self) -> usize {
        self.texts.load(Ordering::SeqCst)
    }
}

impl EmbeddingModel for TableEmbedding {
    fn dim(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn is_normalized(&self) -> bool {
        self.normalized
    }

    async fn embed(&self, texts: &[&str]) -> tutor_core::Result<Vec<Embedding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.fetch_add(texts.len(), Ordering::SeqCst);
        if self.failing {
            anyhow::bail!("embedding backend unavailable");
        }
        Ok(texts
            .iter()
            .map(|text| {
                self.entries
                    .get(*text)
                    .cloned()
                    .unwrap_or_else(|| self.fallback.clone())
            })
            .collect())
    }
}
