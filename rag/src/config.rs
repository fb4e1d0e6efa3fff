//! Configuration for the retrieval pipeline.

use std::path::PathBuf;

/// Configuration shared by ingestion and query time.
#[derive(Debug, Clone)]
pub struct RagConfig {
    /// Path of the persisted vector artifact.
    pub index_path: PathBuf,
    /// Path of the persisted chunk artifact.
    pub chunks_path: PathBuf,
    /// Maximum characters per chunk.
    pub max_chunk_size: usize,
    /// Number of nearest chunks fetched per query.
    pub top_k: usize,
    /// Minimum similarity for a chunk to enter the context.
    pub min_similarity: f32,
    /// Cosine similarity the relevance gate requires against the keyword centroid.
    pub gate_threshold: f32,
    /// Number of distinct queries the relevance gate remembers.
    pub gate_cache_capacity: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("output/textbook_index.rkyv"),
            chunks_path: PathBuf::from("output/text_chunks.json"),
            max_chunk_size: 1000,
            top_k: 3,
            min_similarity: 0.5,
            gate_threshold: 0.7,
            gate_cache_capacity: 100,
        }
    }
}

impl RagConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for custom configuration.
    #[must_use]
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::new()
    }
}

/// Builder for [`RagConfig`].
#[derive(Debug, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Creates a new configuration builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: RagConfig::default(),
        }
    }

    /// Sets the vector artifact path.
    #[must_use]
    pub fn index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.index_path = path.into();
        self
    }

    /// Sets the chunk artifact path.
    #[must_use]
    pub fn chunks_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.chunks_path = path.into();
        self
    }

    /// Sets the maximum chunk size in characters.
    #[must_use]
    pub const fn max_chunk_size(mut self, size: usize) -> Self {
        self.config.max_chunk_size = size;
        self
    }

    /// Sets the number of chunks fetched per query.
    #[must_use]
    pub const fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Sets the minimum similarity for retrieved chunks.
    #[must_use]
    pub const fn min_similarity(mut self, threshold: f32) -> Self {
        self.config.min_similarity = threshold;
        self
    }

    /// Sets the relevance gate's semantic threshold.
    #[must_use]
    pub const fn gate_threshold(mut self, threshold: f32) -> Self {
        self.config.gate_threshold = threshold;
        self
    }

    /// Sets how many queries the relevance gate memoises.
    #[must_use]
    pub const fn gate_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.gate_cache_capacity = capacity;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> RagConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = RagConfig::default();
        assert_eq!(
            config.index_path,
            PathBuf::from("output/textbook_index.rkyv")
        );
        assert_eq!(config.chunks_path, PathBuf::from("output/text_chunks.json"));
        assert_eq!(config.max_chunk_size, 1000);
        assert_eq!(config.top_k, 3);
        assert!((config.min_similarity - 0.5).abs() < f32::EPSILON);
        assert!((config.gate_threshold - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.gate_cache_capacity, 100);
    }

    #[test]
    fn builder_config() {
        let config = RagConfig::builder()
            .index_path("/custom/index.rkyv")
            .chunks_path("/custom/chunks.json")
            .max_chunk_size(200)
            .top_k(5)
            .min_similarity(0.3)
            .gate_threshold(0.8)
            .gate_cache_capacity(8)
            .build();

        assert_eq!(config.index_path, PathBuf::from("/custom/index.rkyv"));
        assert_eq!(config.chunks_path, PathBuf::from("/custom/chunks.json"));
        assert_eq!(config.max_chunk_size, 200);
        assert_eq!(config.top_k, 5);
        assert!((config.min_similarity - 0.3).abs() < f32::EPSILON);
        assert!((config.gate_threshold - 0.8).abs() < f32::EPSILON);
        assert_eq!(config.gate_cache_capacity, 8);
    }
}
