//! Vector index for nearest-neighbour search over chunk embeddings.
//!
//! The corpus is one textbook, so the index is exhaustive: every query is compared with every
//! stored vector under a [`Metric`]. See [`FlatIndex`].

mod flat;

pub use flat::FlatIndex;

/// Distance used to rank stored vectors against a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    /// Squared Euclidean distance. Ranks like cosine only for unit vectors.
    #[default]
    SquaredL2,
    /// Cosine distance, `1 - cos(a, b)`. Independent of vector length.
    Cosine,
}

impl Metric {
    /// Distance between `a` and `b` under this metric.
    #[must_use]
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::SquaredL2 => squared_l2(a, b),
            Self::Cosine => 1.0 - cosine_similarity(a, b),
        }
    }

    /// Similarity implied by a distance under this metric.
    ///
    /// Under [`Metric::SquaredL2`] this assumes unit vectors.
    #[must_use]
    pub fn similarity(self, distance: f32) -> f32 {
        match self {
            Self::SquaredL2 => unit_distance_to_similarity(distance),
            Self::Cosine => 1.0 - distance,
        }
    }
}

/// One search hit: the position of the stored vector and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position in the index, equal to the position of the matching chunk.
    pub position: usize,
    /// Distance to the query under the metric that was searched.
    pub distance: f32,
}

/// Squared Euclidean distance.
#[must_use]
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(lhs, rhs)| {
            let diff = lhs - rhs;
            diff * diff
        })
        .sum()
}

/// Computes cosine similarity between two vectors. Zero vectors have similarity 0.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (lhs, rhs) in a.iter().zip(b) {
        dot += lhs * rhs;
        norm_a += lhs * lhs;
        norm_b += rhs * rhs;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Similarity implied by a squared L2 distance between unit vectors.
///
/// For `|a| = |b| = 1`, `|a - b|² = 2 - 2 cos(a, b)`, so this equals the cosine similarity.
/// Meaningless for vectors that are not normalised.
#[must_use]
pub fn unit_distance_to_similarity(distance: f32) -> f32 {
    1.0 - distance / 2.0
}
