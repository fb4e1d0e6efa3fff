//! Content fingerprint tying the vector artifact to its chunk artifact.

use xxhash_rust::xxh3::xxh3_64;

use crate::types::Chunk;

/// Hashes the full chunk sequence: page, length and text of every chunk, in order.
///
/// Any reordering, insertion, removal or edit changes the fingerprint.
#[must_use]
pub fn chunk_fingerprint(chunks: &[Chunk]) -> u64 {
    let capacity = chunks.iter().map(|c| c.text.len() + 12).sum();
    let mut buffer = Vec::with_capacity(capacity);
    for chunk in chunks {
        buffer.extend_from_slice(&chunk.page.to_le_bytes());
        buffer.extend_from_slice(&(chunk.text.len() as u64).to_le_bytes());
        buffer.extend_from_slice(chunk.text.as_bytes());
    }
    xxh3_64(&buffer)
}
