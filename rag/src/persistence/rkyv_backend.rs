//! rkyv-based binary persistence for the vector artifact.

use rkyv::rancor::Error as RkyvError;
use rkyv::util::AlignedVec;
use rkyv::{from_bytes, to_bytes};
use std::path::{Path, PathBuf};

use crate::error::{RagError, Result};
use crate::store::KnowledgeBase;

use super::{Persistence, read_file, write_file};

/// Layout version written into every vector artifact.
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// The vector artifact as stored on disk.
///
/// `vectors` is row-major, `dimension` floats per chunk. `fingerprint` is the
/// [`chunk_fingerprint`](crate::fingerprint::chunk_fingerprint) of the chunk artifact written
/// alongside it.
#[derive(Debug, Clone, PartialEq, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
#[rkyv(derive(Debug))]
pub struct IndexArtifact {
    /// Layout version, see [`INDEX_FORMAT_VERSION`].
    pub format_version: u32,
    /// Embedding model the vectors came from.
    pub model_id: String,
    /// Vector dimension.
    pub dimension: u32,
    /// Fingerprint of the aligned chunk sequence.
    pub fingerprint: u64,
    /// Row-major vector data.
    pub vectors: Vec<f32>,
}

impl IndexArtifact {
    /// Captures the vector half of a knowledge base.
    ///
    /// # Errors
    /// [`RagError::Serialization`] if the dimension does not fit the on-disk field.
    pub fn from_knowledge(knowledge: &KnowledgeBase) -> Result<Self> {
        let dimension = u32::try_from(knowledge.index().dimension())
            .map_err(|_| RagError::Serialization("dimension exceeds u32".into()))?;
        Ok(Self {
            format_version: INDEX_FORMAT_VERSION,
            model_id: knowledge.model_id().to_string(),
            dimension,
            fingerprint: knowledge.fingerprint(),
            vectors: knowledge.index().as_flat().to_vec(),
        })
    }
}

/// Binary persistence using rkyv.
///
/// ```rust,no_run
/// use tutor_rag::persistence::{Persistence, RkyvPersistence};
///
/// let persistence = RkyvPersistence::new("./index.rkyv");
/// // persistence.save(&artifact)?;
/// // let loaded = persistence.load()?;
/// ```
#[derive(Debug, Clone)]
pub struct RkyvPersistence {
    path: PathBuf,
}

impl RkyvPersistence {
    /// Creates a new rkyv persistence backend.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Persistence for RkyvPersistence {
    type Artifact = IndexArtifact;

    fn save(&self, artifact: &IndexArtifact) -> Result<()> {
        let bytes =
            to_bytes::<RkyvError>(artifact).map_err(|e| RagError::Serialization(e.to_string()))?;
        write_file(&self.path, &bytes)
    }

    fn load(&self) -> Result<IndexArtifact> {
        let bytes = read_file(&self.path)?;
        if bytes.is_empty() {
            return Err(RagError::Serialization(format!(
                "{} is empty",
                self.path.display()
            )));
        }

        let mut aligned = AlignedVec::<16>::with_capacity(bytes.len());
        aligned.extend_from_slice(&bytes);
        let artifact = from_bytes::<IndexArtifact, RkyvError>(&aligned)
            .map_err(|e| RagError::Serialization(format!("{}: {e}", self.path.display())))?;

        if artifact.format_version != INDEX_FORMAT_VERSION {
            return Err(RagError::Serialization(format!(
                "{}: unsupported format version {}",
                self.path.display(),
                artifact.format_version
            )));
        }
        Ok(artifact)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
