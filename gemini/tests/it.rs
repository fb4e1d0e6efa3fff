//! Integration tests for the Gemini backend.

use std::time::Duration;

use tutor_core::{EmbeddingModel, LanguageModel};
use tutor_gemini::{GeminiBackend, GeminiError};

fn api_key() -> String {
    std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY must be set")
}

#[tokio::test]
async fn unreachable_endpoint_is_an_error_not_a_panic() {
    let backend = GeminiBackend::new("unused")
        .with_base_url("http://127.0.0.1:9/v1beta")
        .with_timeout(Duration::from_secs(2));

    let err = backend.complete("hello").await.unwrap_err();
    assert!(err.downcast_ref::<GeminiError>().is_some());
}

#[test]
fn names_strip_resource_prefix() {
    let backend = GeminiBackend::new("k")
        .with_text_model("models/gemini-1.5-pro")
        .with_embedding_model("text-embedding-004", 256);
    assert_eq!(backend.model_name(), "gemini-1.5-pro");
    assert_eq!(backend.model_id(), "text-embedding-004");
    assert_eq!(backend.dim(), 256);
    assert!(!backend.is_normalized());
}

#[tokio::test]
#[ignore = "Requires external Gemini API quota and network access."]
async fn test_complete() {
    let backend = GeminiBackend::new(api_key());
    let text = backend
        .complete("What is 2+2? Answer with just the number.")
        .await
        .expect("Failed to complete");
    assert!(text.contains('4'));
}

#[tokio::test]
#[ignore = "Requires external Gemini API quota and network access."]
async fn test_embedding_batch() {
    let backend = GeminiBackend::new(api_key());
    let vectors = backend
        .embed(&["Hello world", "Python lists are mutable"])
        .await
        .expect("Failed to embed");
    assert_eq!(vectors.len(), 2);
    assert!(vectors.iter().all(|v| v.len() == backend.dim()));
}
