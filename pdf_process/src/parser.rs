use std::path::Path;

use lopdf::Document;

use crate::error::{PdfProcessError, Result};
use crate::model::{DocumentMeta, PdfDocument, PdfPage};

pub(crate) fn parse_from_path(path: &Path) -> Result<PdfDocument> {
    if !path.is_file() {
        return Err(PdfProcessError::NotFound(path.to_path_buf()));
    }
    let doc = Document::load(path).map_err(|e| PdfProcessError::Parse(e.to_string()))?;
    Ok(parse_document(&doc, path.display().to_string()))
}

pub(crate) fn parse_from_bytes(bytes: &[u8], source_name: &str) -> Result<PdfDocument> {
    let doc = Document::load_mem(bytes).map_err(|e| PdfProcessError::Parse(e.to_string()))?;
    Ok(parse_document(&doc, source_name.to_string()))
}

fn parse_document(doc: &Document, source: String) -> PdfDocument {
    let page_map = doc.get_pages();
    let mut page_numbers: Vec<u32> = page_map.keys().copied().collect();
    page_numbers.sort_unstable();

    let pages = page_numbers
        .into_iter()
        .map(|number| {
            // Pages without a decodable text layer read as blank rather than failing the document.
            let text = doc.extract_text(&[number]).unwrap_or_default();
            PdfPage {
                number,
                blocks: split_blocks(&text),
            }
        })
        .collect();

    PdfDocument {
        source,
        metadata: extract_metadata(doc),
        pages,
    }
}

/// Split raw page text into paragraph blocks.
///
/// A block is a run of non-blank lines; blank lines separate blocks. Every line is trimmed
/// and the lines of one block stay joined by `\n`.
pub(crate) fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }
    blocks
}

fn extract_metadata(doc: &Document) -> DocumentMeta {
    let Some(dict) = doc
        .trailer
        .get(b"Info")
        .and_then(lopdf::Object::as_reference)
        .and_then(|info| doc.get_dictionary(info))
        .ok()
    else {
        return DocumentMeta::default();
    };

    let field = |key: &[u8]| {
        dict.get(key)
            .ok()
            .and_then(|v| v.as_str().ok())
            .map(to_clean_string)
    };

    DocumentMeta {
        title: field(b"Title"),
        author: field(b"Author"),
    }
}

fn to_clean_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}
