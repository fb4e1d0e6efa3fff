//! Pooling strategies for extracting sentence embeddings from transformer outputs.

use ndarray::ArrayView2;

/// Strategy for pooling token hidden states into a single embedding vector.
///
/// - sentence-transformers encoders (all-MiniLM-L6-v2 and friends) use [`Mean`](PoolingStrategy::Mean)
/// - BERT classification-style encoders use [`Cls`](PoolingStrategy::Cls)
/// - decoder embedding models use [`LastToken`](PoolingStrategy::LastToken)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PoolingStrategy {
    /// Average all non-padding token hidden states.
    #[default]
    Mean,

    /// Use the first token's hidden state (typically `[CLS]`).
    Cls,

    /// Use the last non-padding token's hidden state.
    LastToken,
}

impl PoolingStrategy {
    /// Pool one sequence of the batch.
    ///
    /// `hidden_states` has shape `[seq_len, hidden_dim]`; `attention_mask` marks valid tokens
    /// with 1 and padding with 0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn apply(&self, hidden_states: &ArrayView2<f32>, attention_mask: &[u32]) -> Vec<f32> {
        let seq_len = hidden_states.shape()[0];
        let hidden_dim = hidden_states.shape()[1];
        if seq_len == 0 {
            return vec![0.0; hidden_dim];
        }

        match self {
            Self::Mean => {
                let valid_count = attention_mask.iter().filter(|&&m| m != 0).count();
                if valid_count == 0 {
                    return vec![0.0; hidden_dim];
                }

                let mut result = vec![0.0; hidden_dim];
                for (seq_idx, &mask) in attention_mask.iter().enumerate().take(seq_len) {
                    if mask != 0 {
                        for (d, value) in result.iter_mut().enumerate() {
                            *value += hidden_states[[seq_idx, d]];
                        }
                    }
                }

                let divisor = valid_count as f32;
                for value in &mut result {
                    *value /= divisor;
                }
                result
            }
            Self::Cls => hidden_states.row(0).to_vec(),
            Self::LastToken => {
                let last_idx = attention_mask
                    .iter()
                    .take(seq_len)
                    .rposition(|&m| m != 0)
                    .unwrap_or(seq_len - 1);
                hidden_states.row(last_idx).to_vec()
            }
        }
    }
}
