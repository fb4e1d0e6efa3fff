/// Minimal PDF metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMeta {
    /// Optional title from PDF info dictionary.
    pub title: Option<String>,
    /// Optional author from PDF info dictionary.
    pub author: Option<String>,
}

/// One page of the source document, split into paragraph-level blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfPage {
    /// 1-based page number in the source PDF.
    pub number: u32,
    /// Non-empty text blocks in their native top-to-bottom order.
    pub blocks: Vec<String>,
}

impl PdfPage {
    /// Build a page from already segmented blocks, dropping the ones that are blank.
    #[must_use]
    pub fn new(number: u32, blocks: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            number,
            blocks: blocks
                .into_iter()
                .map(Into::into)
                .filter(|block: &String| !block.trim().is_empty())
                .collect(),
        }
    }

    /// Returns `true` when the page carries no extractable text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Parsed document: every page in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfDocument {
    /// Source identifier (path or virtual label).
    pub source: String,
    /// Extracted document metadata.
    pub metadata: DocumentMeta,
    /// Pages in ascending page-number order.
    pub pages: Vec<PdfPage>,
}

impl PdfDocument {
    /// Total pages in the source PDF.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
