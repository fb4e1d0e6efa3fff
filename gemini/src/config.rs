use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

/// Gemini REST base URL used by the Developer API.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const USER_AGENT: &str = "tutor-gemini/0.1";
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 768;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Authentication strategy supported by the Gemini backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Attach `?key=API_KEY` to every request (default).
    Query,
    /// Send the API key via `x-goog-api-key` header.
    Header,
}

/// Gemini backend implementing both [`tutor_core::LanguageModel`] and
/// [`tutor_core::EmbeddingModel`].
///
/// Cloning is cheap; all clones share one configuration and one pooled HTTP client.
#[derive(Clone, Debug)]
pub struct GeminiBackend {
    inner: Arc<GeminiConfig>,
}

impl GeminiBackend {
    /// Create a backend using the default completion/embedding models.
    ///
    /// The HTTP client is built here once and reused by every request.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(GeminiConfig {
                http: http_client(),
                api_key: api_key.into(),
                base_url: GEMINI_API_BASE_URL.to_string(),
                auth: AuthMode::Query,
                text_model: sanitize_model(DEFAULT_MODEL),
                embedding_model: sanitize_model(DEFAULT_EMBEDDING_MODEL),
                embedding_dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
                temperature: None,
                max_output_tokens: None,
                timeout: DEFAULT_TIMEOUT,
            }),
        }
    }

    /// Override the REST base URL (useful for sandboxes or proxies).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).base_url = base_url.into();
        self
    }

    /// Select header-based authentication.
    #[must_use]
    pub fn with_auth_mode(mut self, mode: AuthMode) -> Self {
        Arc::make_mut(&mut self.inner).auth = mode;
        self
    }

    /// Override the completion model.
    #[must_use]
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).text_model = sanitize_model(model);
        self
    }

    /// Override the embedding model and its output dimensionality.
    #[must_use]
    pub fn with_embedding_model(mut self, model: impl Into<String>, dim: usize) -> Self {
        let cfg = Arc::make_mut(&mut self.inner);
        cfg.embedding_model = sanitize_model(model);
        cfg.embedding_dimensions = dim;
        self
    }

    /// Set the sampling temperature for completions.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        Arc::make_mut(&mut self.inner).temperature = Some(temperature);
        self
    }

    /// Cap the length of generated answers.
    #[must_use]
    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        Arc::make_mut(&mut self.inner).max_output_tokens = Some(tokens);
        self
    }

    /// Bound every request by `timeout`. Expiry surfaces as [`crate::GeminiError::Timeout`].
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        Arc::make_mut(&mut self.inner).timeout = timeout;
        self
    }

    pub(crate) fn config(&self) -> Arc<GeminiConfig> {
        self.inner.clone()
    }

    pub(crate) fn inner_ref(&self) -> &GeminiConfig {
        &self.inner
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub(crate) http: Client,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) auth: AuthMode,
    pub(crate) text_model: String,
    pub(crate) embedding_model: String,
    pub(crate) embedding_dimensions: usize,
    pub(crate) temperature: Option<f32>,
    pub(crate) max_output_tokens: Option<u32>,
    pub(crate) timeout: Duration,
}

impl GeminiConfig {
    pub(crate) fn endpoint(&self, suffix: &str) -> String {
        let mut url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            suffix.trim_start_matches('/')
        );
        if self.auth == AuthMode::Query {
            let separator = if url.contains('?') { '&' } else { '?' };
            url.push(separator);
            url.push_str("key=");
            url.push_str(&self.api_key);
        }
        url
    }

    pub(crate) fn model_endpoint(&self, model: &str, action: &str) -> String {
        let model = sanitize_model(model);
        self.endpoint(&format!("{model}:{action}"))
    }
}

fn http_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|error| {
            tracing::warn!(error = %error, "falling back to a default gemini http client");
            Client::new()
        })
}

pub fn sanitize_model(model: impl Into<String>) -> String {
    let model = model.into();
    if model.starts_with("models/") {
        model
    } else {
        format!("models/{model}")
    }
}

/// Model name without the `models/` resource prefix.
pub(crate) fn display_model(model: &str) -> &str {
    model.strip_prefix("models/").unwrap_or(model)
}
