//! Chunk extraction.
//!
//! Pages are walked in order and every paragraph block is cut into chunks that never exceed the
//! configured size. The [`Chunker`] trait is the seam; [`FixedSizeChunker`] is the strategy the
//! pipeline uses.

mod fixed;

pub use fixed::FixedSizeChunker;

use std::path::Path;

use tutor_pdf::{PdfPage, PdfProcessor};

use crate::error::{RagError, Result};
use crate::types::Chunk;

/// Trait for text chunking strategies.
pub trait Chunker: Send + Sync {
    /// Splits pages into chunks, preserving page order and block order.
    fn chunk_pages(&self, pages: &[PdfPage]) -> Result<Vec<Chunk>>;

    /// Returns the name of this chunking strategy.
    fn name(&self) -> &'static str;
}

/// Reads every page of a PDF into paragraph blocks.
///
/// # Errors
///
/// [`RagError::NotFound`] if the path is not a readable file, [`RagError::Pdf`] if it does not
/// parse, and [`RagError::EmptyDocument`] if it has zero pages.
pub fn read_pages(document_path: impl AsRef<Path>) -> Result<Vec<PdfPage>> {
    let path = document_path.as_ref();
    let document = PdfProcessor::from_path(path).to_model()?;
    if document.page_count() == 0 {
        return Err(RagError::EmptyDocument(path.to_path_buf()));
    }
    tracing::info!(
        pages = document.page_count(),
        title = document.metadata.title.as_deref().unwrap_or("untitled"),
        source = %path.display(),
        "read document"
    );
    Ok(document.pages)
}

/// Extracts the ordered chunk sequence of a PDF.
///
/// # Errors
///
/// Everything [`read_pages`] reports, plus [`RagError::Chunking`] when `max_chunk_size` is zero.
pub fn extract(document_path: impl AsRef<Path>, max_chunk_size: usize) -> Result<Vec<Chunk>> {
    let chunker = FixedSizeChunker::new(max_chunk_size)?;
    let pages = read_pages(document_path)?;
    chunker.chunk_pages(&pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_document_is_not_found() {
        let err = extract("/no/such/textbook.pdf", 1000).unwrap_err();
        assert!(matches!(err, RagError::NotFound(_)));
    }

    #[test]
    fn zero_chunk_size_is_rejected_before_reading() {
        let err = extract("/no/such/textbook.pdf", 0).unwrap_err();
        assert!(matches!(err, RagError::Chunking(_)));
    }

    #[test]
    fn non_pdf_file_is_a_pdf_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, "plain text, not a PDF").unwrap();

        let err = extract(&path, 1000).unwrap_err();
        assert!(matches!(err, RagError::Pdf(_)));
    }

    #[test]
    fn document_without_pages_is_empty() {
        use lopdf::{Document, Object, dictionary};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.pdf");
        doc.save(&path).unwrap();

        assert!(matches!(read_pages(&path), Err(RagError::EmptyDocument(p)) if p == path));
        assert!(matches!(
            extract(&path, 1000),
            Err(RagError::EmptyDocument(_))
        ));
    }
}
