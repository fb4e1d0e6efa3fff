//! Offline ingestion: document → chunks → embeddings → knowledge base.

use std::path::Path;
use std::sync::Arc;

use tutor_core::EmbeddingModel;
use tutor_pdf::PdfPage;

use crate::chunking::{Chunker, FixedSizeChunker, read_pages};
use crate::error::{RagError, Result};
use crate::index::FlatIndex;
use crate::store::KnowledgeBase;

/// Progress update during ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexProgress {
    /// Units processed so far in the current stage.
    pub processed: usize,
    /// Units in the current stage.
    pub total: usize,
    /// Current stage of ingestion.
    pub stage: IndexStage,
}

impl IndexProgress {
    /// Creates a new progress update.
    #[must_use]
    pub const fn new(processed: usize, total: usize, stage: IndexStage) -> Self {
        Self {
            processed,
            total,
            stage,
        }
    }
}

/// Stages of the ingestion process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStage {
    /// Reading pages and cutting chunks. Units are pages.
    Extracting,
    /// Embedding chunk texts. Units are chunks.
    Embedding,
    /// Building the vector index. Units are vectors.
    Indexing,
    /// Ingestion completed successfully.
    Done,
}

/// Builds a [`KnowledgeBase`] from a textbook.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use tutor_rag::{ArtifactStore, IndexBuilder};
///
/// # async fn ingest<E: tutor_core::EmbeddingModel>(embedder: E) -> tutor_rag::Result<()> {
/// let builder = IndexBuilder::new(Arc::new(embedder), 1000)?;
/// let knowledge = builder.build("data/Python_Programming.pdf").await?;
/// ArtifactStore::new("output/textbook_index.rkyv", "output/text_chunks.json").save(&knowledge)?;
/// # Ok(())
/// # }
/// ```
pub struct IndexBuilder<E> {
    embedder: Arc<E>,
    chunker: FixedSizeChunker,
}

impl<E> std::fmt::Debug for IndexBuilder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexBuilder")
            .field("chunker", &self.chunker)
            .finish_non_exhaustive()
    }
}

impl<E: EmbeddingModel> IndexBuilder<E> {
    /// Creates a builder that cuts chunks of at most `max_chunk_size` characters.
    ///
    /// # Errors
    /// [`RagError::Chunking`] if `max_chunk_size` is zero.
    pub fn new(embedder: Arc<E>, max_chunk_size: usize) -> Result<Self> {
        Ok(Self {
            embedder,
            chunker: FixedSizeChunker::new(max_chunk_size)?,
        })
    }

    /// Ingests the PDF at `document_path`.
    ///
    /// # Errors
    /// Extraction errors ([`RagError::NotFound`], [`RagError::Pdf`], [`RagError::EmptyDocument`]),
    /// [`RagError::Embedding`] if the provider fails, and [`RagError::IndexAlignment`] if it
    /// returns the wrong number of vectors.
    pub async fn build(&self, document_path: impl AsRef<Path>) -> Result<KnowledgeBase> {
        self.build_with_progress(document_path, |_| {}).await
    }

    /// Ingests the PDF at `document_path`, reporting each stage to `on_progress`.
    ///
    /// # Errors
    /// As [`IndexBuilder::build`].
    pub async fn build_with_progress<F>(
        &self,
        document_path: impl AsRef<Path>,
        mut on_progress: F,
    ) -> Result<KnowledgeBase>
    where
        F: FnMut(IndexProgress) + Send,
    {
        let path = document_path.as_ref();
        let pages = read_pages(path)?;
        self.ingest(&pages, path, &mut on_progress).await
    }

    /// Ingests pages that are already in memory.
    ///
    /// # Errors
    /// As [`IndexBuilder::build`]; an empty or text-free page set is [`RagError::EmptyDocument`].
    pub async fn build_from_pages(&self, pages: &[PdfPage]) -> Result<KnowledgeBase> {
        self.ingest(pages, Path::new("<memory>"), &mut |_| {}).await
    }

    async fn ingest<F>(
        &self,
        pages: &[PdfPage],
        source: &Path,
        on_progress: &mut F,
    ) -> Result<KnowledgeBase>
    where
        F: FnMut(IndexProgress) + Send,
    {
        on_progress(IndexProgress::new(0, pages.len(), IndexStage::Extracting));
        let chunks = self.chunker.chunk_pages(pages)?;
        if chunks.is_empty() {
            return Err(RagError::EmptyDocument(source.to_path_buf()));
        }
        on_progress(IndexProgress::new(
            pages.len(),
            pages.len(),
            IndexStage::Extracting,
        ));
        tracing::info!(
            chunks = chunks.len(),
            chunker = self.chunker.name(),
            max_chunk_size = self.chunker.chunk_size(),
            "extracted chunks"
        );

        on_progress(IndexProgress::new(0, chunks.len(), IndexStage::Embedding));
        let texts: Vec<&str> = chunks.iter().map(|chunk| chunk.text.as_str()).collect();
        let embeddings = self
            .embedder
            .embed(&texts)
            .await
            .map_err(RagError::Embedding)?;
        if embeddings.len() != chunks.len() {
            return Err(RagError::IndexAlignment(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }
        on_progress(IndexProgress::new(
            chunks.len(),
            chunks.len(),
            IndexStage::Embedding,
        ));

        on_progress(IndexProgress::new(0, chunks.len(), IndexStage::Indexing));
        let index = FlatIndex::build(self.embedder.dim(), embeddings)?;
        let total = index.len();
        let knowledge = KnowledgeBase::new(index, chunks, self.embedder.model_id())?;
        on_progress(IndexProgress::new(total, total, IndexStage::Indexing));

        tracing::info!(
            vectors = total,
            dimension = self.embedder.dim(),
            model = self.embedder.model_id(),
            "built vector index"
        );
        on_progress(IndexProgress::new(total, total, IndexStage::Done));
        Ok(knowledge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TableEmbedding;

    fn pages() -> Vec<PdfPage> {
        vec![
            PdfPage::new(1, ["a".repeat(50)]),
            PdfPage::new(2, ["b".repeat(1500)]),
        ]
    }

    #[tokio::test]
    async fn builds_aligned_knowledge_base() {
        let embedder = Arc::new(TableEmbedding::new(3));
        let builder = IndexBuilder::new(embedder.clone(), 1000).unwrap();

        let knowledge = builder.build_from_pages(&pages()).await.unwrap();

        assert_eq!(knowledge.len(), 3);
        assert_eq!(knowledge.index().len(), knowledge.chunks().len());
        assert_eq!(knowledge.index().dimension(), 3);
        assert_eq!(knowledge.model_id(), "table");
        assert_eq!(embedder.calls(), 1, "all chunks go out in one batch");
        assert_eq!(embedder.texts_embedded(), 3);
    }

    #[tokio::test]
    async fn text_free_pages_are_an_empty_document() {
        let builder = IndexBuilder::new(Arc::new(TableEmbedding::new(2)), 1000).unwrap();
        let blank = vec![PdfPage::new(1, ["   "]), PdfPage::new(2, Vec::<String>::new())];

        let err = builder.build_from_pages(&blank).await.unwrap_err();
        assert!(matches!(err, RagError::EmptyDocument(_)));
    }

    #[tokio::test]
    async fn provider_failure_is_embedding_error() {
        let builder = IndexBuilder::new(Arc::new(TableEmbedding::new(2).failing()), 1000).unwrap();

        let err = builder.build_from_pages(&pages()).await.unwrap_err();
        assert!(matches!(err, RagError::Embedding(_)));
    }

    #[tokio::test]
    async fn progress_walks_every_stage() {
        let builder = IndexBuilder::new(Arc::new(TableEmbedding::new(2)), 1000).unwrap();
        let mut updates = Vec::new();
        builder
            .ingest(&pages(), Path::new("mem"), &mut |p| updates.push(p))
            .await
            .unwrap();
        assert_eq!(updates.first().unwrap().stage, IndexStage::Extracting);
        assert_eq!(
            updates.last().unwrap(),
            &IndexProgress::new(3, 3, IndexStage::Done)
        );
        assert!(updates.iter().any(|p| p.stage == IndexStage::Embedding));
        assert!(updates.iter().any(|p| p.stage == IndexStage::Indexing));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let err = IndexBuilder::new(Arc::new(TableEmbedding::new(2)), 0).unwrap_err();
        assert!(matches!(err, RagError::Chunking(_)));
    }

    #[test]
    fn debug_output_skips_embedder() {
        let builder = IndexBuilder::new(Arc::new(TableEmbedding::new(2)), 500).unwrap();
        let rendered = format!("{builder:?}");
        assert!(rendered.starts_with("IndexBuilder"));
        assert!(rendered.contains("500"));
    }
}
