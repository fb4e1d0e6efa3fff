//! Embedding backend selection for the CLI.

use tutor::gemini::GeminiBackend;
use tutor::ort::OrtEmbedding;
use tutor::{Embedding, EmbeddingModel};

/// Supported embedding backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbedderKind {
    /// Local ONNX sentence-transformer.
    #[default]
    Ort,
    /// Gemini embedding API.
    Gemini,
}

impl EmbedderKind {
    /// Parse backend from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ort" | "onnx" | "local" => Some(Self::Ort),
            "gemini" | "google" => Some(Self::Gemini),
            _ => None,
        }
    }
}

impl std::fmt::Display for EmbedderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ort => write!(f, "ort"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

impl std::str::FromStr for EmbedderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown embedder: {s}"))
    }
}

/// The embedding backend chosen at startup.
pub enum Embedder {
    /// Local ONNX model.
    Ort(OrtEmbedding),
    /// Gemini embedding API.
    Gemini(GeminiBackend),
}

impl std::fmt::Debug for Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field("kind", &self.kind())
            .field("model_id", &self.model_id())
            .field("dim", &self.dim())
            .finish()
    }
}

impl Embedder {
    /// Which backend this is.
    #[must_use]
    pub const fn kind(&self) -> EmbedderKind {
        match self {
            Self::Ort(_) => EmbedderKind::Ort,
            Self::Gemini(_) => EmbedderKind::Gemini,
        }
    }
}

impl From<OrtEmbedding> for Embedder {
    fn from(model: OrtEmbedding) -> Self {
        Self::Ort(model)
    }
}

impl From<GeminiBackend> for Embedder {
    fn from(backend: GeminiBackend) -> Self {
        Self::Gemini(backend)
    }
}

impl EmbeddingModel for Embedder {
    fn dim(&self) -> usize {
        match self {
            Self::Ort(model) => model.dim(),
            Self::Gemini(backend) => EmbeddingModel::dim(backend),
        }
    }

    fn model_id(&self) -> &str {
        match self {
            Self::Ort(model) => model.model_id(),
            Self::Gemini(backend) => EmbeddingModel::model_id(backend),
        }
    }

    fn is_normalized(&self) -> bool {
        match self {
            Self::Ort(model) => model.is_normalized(),
            Self::Gemini(backend) => EmbeddingModel::is_normalized(backend),
        }
    }

    async fn embed(&self, texts: &[&str]) -> tutor::Result<Vec<Embedding>> {
        match self {
            Self::Ort(model) => model.embed(texts).await,
            Self::Gemini(backend) => EmbeddingModel::embed(backend, texts).await,
        }
    }
}
