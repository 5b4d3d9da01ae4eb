//! Error types for prompt composition and scene generation.

use std::time::Duration;

/// Message shown to end users in place of detailed diagnostics.
pub const GENERIC_USER_MESSAGE: &str = "An error occurred during generation.";

/// Maximum length of an upstream error body kept in an error message.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Errors that can occur while talking to the generation service.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// API key missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized upstream message.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Delay from the `Retry-After` header, when present.
        retry_after: Option<Duration>,
    },

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters, rejected before any network call.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The image call succeeded but returned no inline image part.
    #[error("no image generated")]
    NoImageGenerated,

    /// The response had an unexpected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., reading an input image or saving a result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StudioError {
    /// Returns the message to show an end user.
    ///
    /// Input validation errors are the user's to fix, so their detail is kept;
    /// everything else collapses to one generic message.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidRequest(msg) => msg.clone(),
            _ => GENERIC_USER_MESSAGE.to_string(),
        }
    }

    /// Returns true if the request never left the process.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }
}

/// Result type alias for generation operations.
pub type Result<T> = std::result::Result<T, StudioError>;

/// Redacts API keys and truncates an upstream error body.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let redacted = redact_api_keys(text.trim());
    if redacted.chars().count() <= MAX_ERROR_MESSAGE_LEN {
        return redacted;
    }
    let truncated: String = redacted.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
    format!("{truncated}...")
}

fn redact_api_keys(text: &str) -> String {
    // Google API keys start with "AIza" and run 39 characters.
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("AIza") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let key_len = tail
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(tail.len());
        out.push_str("[REDACTED]");
        rest = &tail[key_len..];
    }
    out.push_str(rest);
    out
}

/// Parses a `Retry-After` header given in seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
