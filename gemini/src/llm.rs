use tutor_core::LanguageModel;

use crate::{
    client::call_generate,
    config::{GeminiBackend, display_model},
    error::GeminiError,
    types::{GenerateContentRequest, GenerationConfig},
};

impl LanguageModel for GeminiBackend {
    fn model_name(&self) -> &str {
        display_model(&self.inner_ref().text_model)
    }

    fn complete(
        &self,
        prompt: &str,
    ) -> impl core::future::Future<Output = tutor_core::Result<String>> + Send {
        let cfg = self.config();
        let prompt = prompt.to_owned();
        async move {
            let request = GenerateContentRequest::prompt(
                prompt,
                GenerationConfig {
                    temperature: cfg.temperature,
                    max_output_tokens: cfg.max_output_tokens,
                },
            );
            tracing::debug!(model = %display_model(&cfg.text_model), "requesting gemini completion");
            let response = call_generate(&cfg, &cfg.text_model, &request).await?;
            let text = response.into_text().map_err(GeminiError::EmptyResponse)?;
            Ok(text)
        }
    }
}
