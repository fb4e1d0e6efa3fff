//! Persistence of the two ingestion artifacts.
//!
//! Ingestion writes a vector artifact (binary, [`RkyvPersistence`]) and a chunk artifact (JSON,
//! [`JsonChunks`]). [`ArtifactStore`] saves and loads them as a pair and refuses, at load time,
//! any pair that does not belong together.

mod json_backend;
mod rkyv_backend;

pub use json_backend::JsonChunks;
pub use rkyv_backend::{INDEX_FORMAT_VERSION, IndexArtifact, RkyvPersistence};

use std::path::{Path, PathBuf};

use tutor_core::EmbeddingModel;

use crate::config::RagConfig;
use crate::error::{RagError, Result};
use crate::index::FlatIndex;
use crate::store::KnowledgeBase;

/// Trait for persistence backends.
pub trait Persistence: Send + Sync {
    /// The value stored by this backend.
    type Artifact;

    /// Writes the artifact, creating parent directories.
    fn save(&self, artifact: &Self::Artifact) -> Result<()>;

    /// Reads the artifact.
    ///
    /// A missing file is [`RagError::NotFound`]; it never reads as empty.
    fn load(&self) -> Result<Self::Artifact>;

    /// Returns the storage path.
    fn path(&self) -> &Path;
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            RagError::NotFound(path.to_path_buf())
        } else {
            RagError::Persistence {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

pub(crate) fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| RagError::Persistence {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    std::fs::write(path, bytes).map_err(|source| RagError::Persistence {
        path: path.to_path_buf(),
        source,
    })
}

/// The vector artifact and chunk artifact of one ingestion run.
///
/// ```rust,no_run
/// use tutor_rag::persistence::ArtifactStore;
/// # fn load<E: tutor_core::EmbeddingModel>(embedder: &E) -> tutor_rag::Result<()> {
/// let store = ArtifactStore::new("output/textbook_index.rkyv", "output/text_chunks.json");
/// let knowledge = store.load(embedder)?;
/// println!("{} chunks", knowledge.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    index: RkyvPersistence,
    chunks: JsonChunks,
}

impl ArtifactStore {
    /// Creates a store for the given artifact paths.
    #[must_use]
    pub fn new(index_path: impl Into<PathBuf>, chunks_path: impl Into<PathBuf>) -> Self {
        Self {
            index: RkyvPersistence::new(index_path),
            chunks: JsonChunks::new(chunks_path),
        }
    }

    /// Creates a store for the paths named in `config`.
    #[must_use]
    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(&config.index_path, &config.chunks_path)
    }

    /// Path of the vector artifact.
    #[must_use]
    pub fn index_path(&self) -> &Path {
        self.index.path()
    }

    /// Path of the chunk artifact.
    #[must_use]
    pub fn chunks_path(&self) -> &Path {
        self.chunks.path()
    }

    /// Writes both artifacts.
    ///
    /// # Errors
    /// [`RagError::Persistence`] on IO failure, [`RagError::Serialization`] on encoding failure.
    pub fn save(&self, knowledge: &KnowledgeBase) -> Result<()> {
        let artifact = IndexArtifact::from_knowledge(knowledge)?;
        self.index.save(&artifact)?;
        self.chunks.save(&knowledge.chunks().to_vec())?;
        tracing::info!(
            chunks = knowledge.len(),
            index = %self.index.path().display(),
            chunks_file = %self.chunks.path().display(),
            "saved index artifacts"
        );
        Ok(())
    }

    /// Loads the pair and verifies it against `embedder`.
    ///
    /// # Errors
    /// - [`RagError::NotFound`] if either artifact is missing
    /// - [`RagError::Serialization`] if either artifact is corrupt
    /// - [`RagError::IndexAlignment`] if the artifacts do not belong together
    /// - [`RagError::DimensionMismatch`] / [`RagError::ModelMismatch`] if `embedder` differs from
    ///   the model the index was built with
    pub fn load<E: EmbeddingModel>(&self, embedder: &E) -> Result<KnowledgeBase> {
        let knowledge = self.load_unchecked()?;
        knowledge.ensure_compatible(embedder)?;
        tracing::info!(
            chunks = knowledge.len(),
            model = knowledge.model_id(),
            dimension = knowledge.index().dimension(),
            "loaded knowledge base"
        );
        Ok(knowledge)
    }

    /// Loads the pair, verifying only that the artifacts belong together.
    ///
    /// # Errors
    /// As [`ArtifactStore::load`], minus the embedder checks.
    pub fn load_unchecked(&self) -> Result<KnowledgeBase> {
        let artifact = self.index.load()?;
        let chunks = self.chunks.load()?;

        let dimension = artifact.dimension as usize;
        let index = FlatIndex::from_flat(dimension, artifact.vectors)?;
        let knowledge = KnowledgeBase::new(index, chunks, artifact.model_id)?;

        if knowledge.fingerprint() != artifact.fingerprint {
            return Err(RagError::IndexAlignment(format!(
                "{} was not built from {} (fingerprint {:016x} != {:016x})",
                self.index.path().display(),
                self.chunks.path().display(),
                artifact.fingerprint,
                knowledge.fingerprint()
            )));
        }
        Ok(knowledge)
    }
}
