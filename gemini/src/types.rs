use serde::{Deserialize, Serialize};

use crate::config::sanitize_model;

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub(crate) contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub(crate) generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    pub(crate) fn prompt(prompt: impl Into<String>, config: GenerationConfig) -> Self {
        let generation_config =
            (config.temperature.is_some() || config.max_output_tokens.is_some()).then_some(config);
        Self {
            contents: vec![GeminiContent::text("user", prompt)],
            generation_config,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) role: Option<String>,
    /// Parts of the content. Defaults to empty if not present in response.
    #[serde(default)]
    pub(crate) parts: Vec<Part>,
}

impl GeminiContent {
    pub(crate) fn text(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenated text of every non-thought part.
    pub(crate) fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter(|part| part.thought != Some(true))
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

impl Part {
    pub(crate) fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            thought: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) temperature: Option<f32>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    pub(crate) max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    #[serde(default)]
    pub(crate) prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    pub(crate) fn primary_candidate(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// Text of the first candidate, or the reason there is none.
    pub(crate) fn into_text(self) -> Result<String, String> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.clone())
        {
            return Err(format!("prompt blocked ({reason})"));
        }
        let candidate = self
            .primary_candidate()
            .ok_or_else(|| "no candidates".to_string())?;
        let text = candidate
            .content
            .as_ref()
            .map(GeminiContent::joined_text)
            .unwrap_or_default();
        if text.trim().is_empty() {
            let reason = candidate
                .finish_reason
                .clone()
                .unwrap_or_else(|| "empty candidate".to_string());
            return Err(reason);
        }
        Ok(text)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Candidate {
    pub(crate) content: Option<GeminiContent>,
    #[serde(rename = "finishReason", default)]
    pub(crate) finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PromptFeedback {
    #[serde(rename = "blockReason")]
    #[serde(default)]
    pub(crate) block_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedContentRequest {
    pub(crate) model: String,
    pub(crate) content: GeminiContent,
    #[serde(
        rename = "outputDimensionality",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) output_dimensionality: Option<usize>,
}

impl EmbedContentRequest {
    pub(crate) fn new(model: &str, content: GeminiContent, dim: Option<usize>) -> Self {
        Self {
            model: sanitize_model(model),
            content,
            output_dimensionality: dim,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchEmbedContentsRequest {
    pub(crate) requests: Vec<EmbedContentRequest>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct BatchEmbedContentsResponse {
    #[serde(default)]
    pub(crate) embeddings: Vec<EmbeddingValue>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EmbeddingValue {
    pub(crate) values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prompt_request_serializes_camel_case() {
        let request = GenerateContentRequest::prompt(
            "What is a tuple?",
            GenerationConfig {
                temperature: Some(0.2),
                max_output_tokens: None,
            },
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "What is a tuple?"}]}],
                "generationConfig": {"temperature": 0.2_f32},
            })
        );
    }

    #[test]
    fn prompt_without_temperature_omits_config() {
        let value = serde_json::to_value(GenerateContentRequest::prompt("q", GenerationConfig::default())).unwrap();
        assert!(value.get("generationConfig").is_none());
    }

    #[test]
    fn response_text_skips_thoughts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "thinking...", "thought": true},
                    {"text": "A tuple is "},
                    {"text": "immutable."}
                ]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "A tuple is immutable.");
    }

    #[test]
    fn blocked_prompt_has_reason() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert_eq!(response.into_text().unwrap_err(), "prompt blocked (SAFETY)");
    }

    #[test]
    fn empty_candidate_reports_finish_reason() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": []}, "finishReason": "MAX_TOKENS"}]
        }))
        .unwrap();
        assert_eq!(response.into_text().unwrap_err(), "MAX_TOKENS");
    }

    #[test]
    fn batch_embed_request_shape() {
        let request = BatchEmbedContentsRequest {
            requests: vec![EmbedContentRequest::new(
                "text-embedding-004",
                GeminiContent::text("user", "loops"),
                Some(768),
            )],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["requests"][0]["model"], "models/text-embedding-004");
        assert_eq!(value["requests"][0]["outputDimensionality"], 768);
        assert_eq!(value["requests"][0]["content"]["parts"][0]["text"], "loops");
    }
}
