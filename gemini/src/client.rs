use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    config::{AuthMode, GeminiConfig},
    error::GeminiError,
    types::{
        BatchEmbedContentsRequest, BatchEmbedContentsResponse, GenerateContentRequest,
        GenerateContentResponse,
    },
};

const MAX_ATTEMPTS: u64 = 3;

pub async fn call_generate(
    cfg: &GeminiConfig,
    model: &str,
    request: &GenerateContentRequest,
) -> Result<GenerateContentResponse, GeminiError> {
    post_json(cfg, cfg.model_endpoint(model, "generateContent"), request).await
}

pub async fn batch_embed_contents(
    cfg: &GeminiConfig,
    request: &BatchEmbedContentsRequest,
) -> Result<BatchEmbedContentsResponse, GeminiError> {
    post_json(
        cfg,
        cfg.model_endpoint(&cfg.embedding_model, "batchEmbedContents"),
        request,
    )
    .await
}

async fn post_json<T: DeserializeOwned, S: Serialize + Sync>(
    cfg: &GeminiConfig,
    endpoint: String,
    body: &S,
) -> Result<T, GeminiError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match send_once(cfg, &endpoint, body).await {
            Err(error) if error.is_retryable() && attempt < MAX_ATTEMPTS => {
                tracing::warn!(attempt, error = %error, "gemini request failed, retrying");
                tokio::time::sleep(Duration::from_millis(200 * attempt)).await;
            }
            result => return result,
        }
    }
}

async fn send_once<T: DeserializeOwned, S: Serialize + Sync>(
    cfg: &GeminiConfig,
    endpoint: &str,
    body: &S,
) -> Result<T, GeminiError> {
    let mut builder = cfg.http.post(endpoint).timeout(cfg.timeout).json(body);
    if cfg.auth == AuthMode::Header {
        builder = builder.header("x-goog-api-key", &cfg.api_key);
    }

    let response = builder
        .send()
        .await
        .map_err(|e| GeminiError::from_transport(e, cfg.timeout))?;
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| GeminiError::from_transport(e, cfg.timeout))?;
    if !status.is_success() {
        return Err(GeminiError::from_status(status.as_u16(), &text));
    }
    Ok(serde_json::from_str(&text)?)
}
