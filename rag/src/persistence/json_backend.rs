//! JSON persistence for the chunk artifact.

use std::path::{Path, PathBuf};

use crate::error::{RagError, Result};
use crate::types::Chunk;

use super::{Persistence, read_file, write_file};

/// Stores the chunk sequence as a JSON array of `{"text", "page"}` records.
///
/// The file is human-readable on purpose: it is the part of the knowledge base a person
/// inspects when an answer cites an unexpected page.
#[derive(Debug, Clone)]
pub struct JsonChunks {
    path: PathBuf,
}

impl JsonChunks {
    /// Creates a new JSON chunk backend.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Persistence for JsonChunks {
    type Artifact = Vec<Chunk>;

    fn save(&self, chunks: &Vec<Chunk>) -> Result<()> {
        let bytes =
            serde_json::to_vec_pretty(chunks).map_err(|e| RagError::Serialization(e.to_string()))?;
        write_file(&self.path, &bytes)
    }

    fn load(&self) -> Result<Vec<Chunk>> {
        let bytes = read_file(&self.path)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| RagError::Serialization(format!("{}: {e}", self.path.display())))
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load() {
        let dir = tempdir().unwrap();
        let persistence = JsonChunks::new(dir.path().join("chunks.json"));
        let chunks = vec![Chunk::new("Lists are ordered.", 3), Chunk::new("", 4)];

        persistence.save(&chunks).unwrap();
        assert_eq!(persistence.load().unwrap(), chunks);
    }

    #[test]
    fn records_carry_text_and_page() {
        let dir = tempdir().unwrap();
        let persistence = JsonChunks::new(dir.path().join("chunks.json"));
        persistence.save(&vec![Chunk::new("loops", 7)]).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(persistence.path()).unwrap()).unwrap();
        assert_eq!(raw[0]["text"], "loops");
        assert_eq!(raw[0]["page"], 7);
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chunks.json");
        std::fs::write(&path, "[{\"text\": 1}]").unwrap();

        assert!(matches!(
            JsonChunks::new(&path).load(),
            Err(RagError::Serialization(_))
        ));
    }
}
