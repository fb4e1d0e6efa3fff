//! Core types for the RAG crate.

use serde::{Deserialize, Serialize};

/// Text returned by the retriever when no chunk clears the similarity threshold.
pub const NO_CONTENT_SENTINEL: &str = "No relevant textbook content found.";
/// Text returned by the retriever when embedding or search fails.
pub const RETRIEVAL_ERROR_SENTINEL: &str = "Error retrieving context.";
/// Separator placed between rendered chunks.
pub const CONTEXT_SEPARATOR: &str = "\n---\n";

/// A page-tagged, size-bounded unit of extracted text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content of the chunk.
    pub text: String,
    /// 1-based page the text came from.
    pub page: u32,
}

impl Chunk {
    /// Creates a new chunk.
    #[must_use]
    pub fn new(text: impl Into<String>, page: u32) -> Self {
        Self {
            text: text.into(),
            page,
        }
    }

    /// Renders the chunk as a page-tagged block.
    #[must_use]
    pub fn render(&self) -> String {
        format!("[Page {}]\n{}", self.page, self.text)
    }
}

/// A retrieved chunk with its similarity to the query.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredChunk {
    /// The matching chunk.
    pub chunk: Chunk,
    /// Similarity score, higher is better (roughly 0.0 to 1.0).
    pub similarity: f32,
}

/// Retrieved chunks ordered by descending similarity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RetrievedContext {
    hits: Vec<ScoredChunk>,
}

impl RetrievedContext {
    pub(crate) const fn new(hits: Vec<ScoredChunk>) -> Self {
        Self { hits }
    }

    /// Hits in descending similarity order.
    #[must_use]
    pub fn hits(&self) -> &[ScoredChunk] {
        &self.hits
    }

    /// Number of hits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Returns `true` if nothing cleared the threshold.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Pages cited by the hits, in hit order, without repeats.
    #[must_use]
    pub fn pages(&self) -> Vec<u32> {
        let mut pages = Vec::with_capacity(self.hits.len());
        for hit in &self.hits {
            if !pages.contains(&hit.chunk.page) {
                pages.push(hit.chunk.page);
            }
        }
        pages
    }

    /// Renders the context string handed to the prompt composer.
    ///
    /// Never empty: without hits this is [`NO_CONTENT_SENTINEL`].
    #[must_use]
    pub fn render(&self) -> String {
        if self.hits.is_empty() {
            return NO_CONTENT_SENTINEL.to_string();
        }
        self.hits
            .iter()
            .map(|hit| hit.chunk.render())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(text: &str, page: u32, similarity: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk::new(text, page),
            similarity,
        }
    }

    #[test]
    fn empty_context_renders_sentinel() {
        assert_eq!(RetrievedContext::default().render(), NO_CONTENT_SENTINEL);
    }

    #[test]
    fn hits_render_with_page_tags_and_separator() {
        let context = RetrievedContext::new(vec![
            hit("Lists are mutable.", 12, 0.9),
            hit("Tuples are not.", 14, 0.7),
        ]);
        assert_eq!(
            context.render(),
            "[Page 12]\nLists are mutable.\n---\n[Page 14]\nTuples are not."
        );
    }

    #[test]
    fn pages_are_deduplicated_in_order() {
        let context = RetrievedContext::new(vec![
            hit("a", 3, 0.9),
            hit("b", 1, 0.8),
            hit("c", 3, 0.7),
        ]);
        assert_eq!(context.pages(), vec![3, 1]);
    }

    #[test]
    fn chunk_json_shape() {
        let json = serde_json::to_string(&Chunk::new("x = 1", 2)).unwrap();
        assert_eq!(json, r#"{"text":"x = 1","page":2}"#);
    }
}
