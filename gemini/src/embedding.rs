use tutor_core::{Embedding, EmbeddingModel};

use crate::{
    client::batch_embed_contents,
    config::{GeminiBackend, display_model},
    error::GeminiError,
    types::{BatchEmbedContentsRequest, EmbedContentRequest, GeminiContent},
};

/// `batchEmbedContents` accepts at most this many requests per call.
const MAX_BATCH: usize = 100;

impl EmbeddingModel for GeminiBackend {
    fn dim(&self) -> usize {
        self.inner_ref().embedding_dimensions
    }

    fn model_id(&self) -> &str {
        display_model(&self.inner_ref().embedding_model)
    }

    fn embed(
        &self,
        texts: &[&str],
    ) -> impl core::future::Future<Output = tutor_core::Result<Vec<Embedding>>> + Send {
        let cfg = self.config();
        let texts: Vec<String> = texts.iter().map(|&text| text.to_owned()).collect();
        async move {
            let mut embeddings = Vec::with_capacity(texts.len());
            for batch in texts.chunks(MAX_BATCH) {
                let request = BatchEmbedContentsRequest {
                    requests: batch
                        .iter()
                        .map(|text| {
                            EmbedContentRequest::new(
                                &cfg.embedding_model,
                                GeminiContent::text("user", text.as_str()),
                                Some(cfg.embedding_dimensions),
                            )
                        })
                        .collect(),
                };
                let response = batch_embed_contents(&cfg, &request).await?;
                if response.embeddings.len() != batch.len() {
                    return Err(GeminiError::EmptyResponse(format!(
                        "expected {} embeddings, got {}",
                        batch.len(),
                        response.embeddings.len()
                    ))
                    .into());
                }
                embeddings.extend(response.embeddings.into_iter().map(|e| e.values));
            }
            Ok(embeddings)
        }
    }
}
