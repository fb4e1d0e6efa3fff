//! Page and paragraph-block extraction for textbook PDFs.
//!
//! The reader walks pages in ascending order and splits each page's text layer into
//! paragraph-level blocks, the unit the chunker later slices into retrieval chunks.

mod error;
mod model;
mod parser;

pub use error::{PdfProcessError, Result};
pub use model::{DocumentMeta, PdfDocument, PdfPage};

use std::path::PathBuf;

/// PDF processor entrypoint.
#[derive(Debug, Clone)]
pub struct PdfProcessor {
    source: PdfSource,
}

#[derive(Debug, Clone)]
enum PdfSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl PdfProcessor {
    /// Build a processor from a PDF file path.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: PdfSource::Path(path.into()),
        }
    }

    /// Build a processor from PDF bytes.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: PdfSource::Bytes(bytes.into()),
        }
    }

    /// Read every page of the document into blocks.
    ///
    /// # Errors
    ///
    /// Returns [`PdfProcessError::NotFound`] when the path is not a readable file and
    /// [`PdfProcessError::Parse`] when the input is not a PDF.
    pub fn to_model(&self) -> Result<PdfDocument> {
        match &self.source {
            PdfSource::Path(path) => parser::parse_from_path(path),
            PdfSource::Bytes(bytes) => parser::parse_from_bytes(bytes, "memory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    fn pdf_with_pages(texts: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in texts {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = i64::try_from(kids.len()).unwrap();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn invalid_pdf_errors() {
        let processor = PdfProcessor::from_bytes(b"not-a-pdf".to_vec());
        assert!(matches!(
            processor.to_model(),
            Err(PdfProcessError::Parse(_))
        ));
    }

    #[test]
    fn missing_path_is_not_found() {
        let processor = PdfProcessor::from_path("/definitely/not/here.pdf");
        assert!(matches!(
            processor.to_model(),
            Err(PdfProcessError::NotFound(_))
        ));
    }

    #[test]
    fn pages_are_numbered_from_one_in_order() {
        let bytes = pdf_with_pages(&["first", "second", "third"]);
        let document = PdfProcessor::from_bytes(bytes).to_model().unwrap();

        assert_eq!(document.page_count(), 3);
        let numbers: Vec<u32> = document.pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(document.source, "memory");
    }

    #[test]
    fn zero_page_document_has_no_pages() {
        let bytes = pdf_with_pages(&[]);
        let document = PdfProcessor::from_bytes(bytes).to_model().unwrap();
        assert_eq!(document.page_count(), 0);
    }

    #[test]
    fn page_constructor_drops_blank_blocks() {
        let page = PdfPage::new(4, ["intro", "   ", "", "body"]);
        assert_eq!(page.blocks, vec!["intro".to_string(), "body".to_string()]);
        assert!(!page.is_blank());
        assert!(PdfPage::new(5, Vec::<String>::new()).is_blank());
    }
}
