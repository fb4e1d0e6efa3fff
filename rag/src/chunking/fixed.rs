//! Fixed-size text chunking.

use tutor_pdf::PdfPage;

use crate::error::{RagError, Result};
use crate::types::Chunk;

use super::Chunker;

/// Cuts every block greedily into pieces of at most `chunk_size` characters.
///
/// Splitting is pure character counting: no word or sentence boundaries, no overlap. The same
/// input and size always produce the same chunks, which keeps rebuilt indexes reproducible.
///
/// # Example
///
/// ```rust
/// use tutor_pdf::PdfPage;
/// use tutor_rag::chunking::{Chunker, FixedSizeChunker};
///
/// let chunker = FixedSizeChunker::new(4).unwrap();
/// let chunks = chunker.chunk_pages(&[PdfPage::new(1, ["abcdefghij"])]).unwrap();
/// let texts: Vec<_> = chunks.iter().map(|c| c.text.as_str()).collect();
/// assert_eq!(texts, ["abcd", "efgh", "ij"]);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    /// Maximum size of each chunk in characters.
    chunk_size: usize,
}

impl FixedSizeChunker {
    /// Creates a new fixed-size chunker.
    ///
    /// # Errors
    /// Returns [`RagError::Chunking`] if `chunk_size` is zero.
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::Chunking(
                "max chunk size must be at least one character".into(),
            ));
        }
        Ok(Self { chunk_size })
    }

    /// Maximum characters per chunk.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl Default for FixedSizeChunker {
    fn default() -> Self {
        Self { chunk_size: 1000 }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk_pages(&self, pages: &[PdfPage]) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        for page in pages {
            for block in &page.blocks {
                let block = block.trim();
                if block.is_empty() {
                    continue;
                }
                chunks.extend(
                    split_fixed(block, self.chunk_size)
                        .into_iter()
                        .map(|piece| Chunk::new(piece, page.number)),
                );
            }
        }
        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        "fixed_size"
    }
}

/// Splits `text` into consecutive pieces of at most `max_chars` characters.
fn split_fixed(text: &str, max_chars: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let cut = rest
            .char_indices()
            .nth(max_chars)
            .map_or(rest.len(), |(idx, _)| idx);
        let (head, tail) = rest.split_at(cut);
        pieces.push(head);
        rest = tail;
    }
    pieces
}
