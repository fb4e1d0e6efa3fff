use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// Errors raised by the Gemini backend.
#[derive(Debug)]
pub enum GeminiError {
    /// The request did not complete within the configured timeout.
    Timeout(Duration),
    /// HTTP transport errors.
    Http(reqwest::Error),
    /// Non-success status returned by the API.
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body when available.
        message: String,
    },
    /// JSON serialization/deserialization problems.
    Json(serde_json::Error),
    /// The API answered without any usable content (blocked prompt, empty candidate list).
    EmptyResponse(String),
}

/// Gemini API error response structure.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    pub message: Option<String>,
    pub status: Option<String>,
}

impl ApiErrorResponse {
    /// Extract a user-friendly message from the error response.
    pub fn friendly_message(&self) -> Option<String> {
        let error = self.error.as_ref()?;
        error.message.clone().or_else(|| error.status.clone())
    }
}

impl fmt::Display for GeminiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(after) => write!(f, "Request timed out after {}s", after.as_secs()),
            Self::Http(err) if err.is_connect() => write!(
                f,
                "Network connection failed - check your internet connection"
            ),
            Self::Http(err) => write!(f, "Request failed: {err}"),
            Self::Api { status, message } => write!(f, "{message} (HTTP {status})"),
            Self::Json(err) => write!(f, "Invalid response format: {err}"),
            Self::EmptyResponse(reason) => write!(f, "Gemini returned no content: {reason}"),
        }
    }
}

impl std::error::Error for GeminiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl GeminiError {
    /// Whether the request may succeed if sent again.
    ///
    /// Timeouts are final: the configured timeout bounds the whole call.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(err) => err.is_connect(),
            Self::Api { status, .. } => *status == 429 || *status == 408 || *status >= 500,
            Self::Timeout(_) | Self::Json(_) | Self::EmptyResponse(_) => false,
        }
    }

    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::Http(err)
        }
    }

    /// Build an API error from a status code and the raw response body.
    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ApiErrorResponse>(body)
            .ok()
            .and_then(|parsed| parsed.friendly_message())
            .unwrap_or_else(|| status_message(status));
        Self::Api { status, message }
    }
}

fn status_message(status: u16) -> String {
    match status {
        400 => "Invalid request".to_string(),
        401 => "Authentication failed - check your API key".to_string(),
        403 => "Access denied - check your API key permissions".to_string(),
        404 => "Model not found".to_string(),
        429 => "Rate limit exceeded - please wait before retrying".to_string(),
        500 => "Server error - please try again".to_string(),
        502..=504 => "Service temporarily unavailable - please try again".to_string(),
        _ => format!("HTTP error {status}"),
    }
}

impl From<serde_json::Error> for GeminiError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
