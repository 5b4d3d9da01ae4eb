//! Backend trait and the request shapes that cross it.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// One part of a multimodal request or response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    /// Plain text.
    Text(String),
    /// Base64 binary payload with its MIME type.
    InlineData {
        /// MIME type, e.g. `image/png`.
        mime_type: String,
        /// Base64 payload without any data URI prefix.
        data: String,
    },
}

impl ContentPart {
    /// Creates a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Creates an inline data part.
    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::InlineData {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Returns the base64 payload if this is an inline image.
    pub fn as_inline_image(&self) -> Option<&str> {
        match self {
            Self::InlineData { mime_type, data } if mime_type.starts_with("image/") => {
                Some(data.as_str())
            }
            _ => None,
        }
    }
}

/// A call to the text (and vision) model.
#[derive(Debug, Clone, Default)]
pub struct TextRequest {
    /// System instruction describing the task.
    pub system_instruction: String,
    /// User content.
    pub parts: Vec<ContentPart>,
    /// JSON schema for structured output. When set, the reply is JSON text.
    pub response_schema: Option<Value>,
}

impl TextRequest {
    /// Creates a request with a system instruction and no content.
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            ..Default::default()
        }
    }

    /// Appends a content part.
    pub fn with_part(mut self, part: ContentPart) -> Self {
        self.parts.push(part);
        self
    }

    /// Requests structured JSON output matching `schema`.
    pub fn with_response_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// A call to the image model. The reply modality is always image.
#[derive(Debug, Clone, Default)]
pub struct ImageRequest {
    /// Inline images followed by the task text.
    pub parts: Vec<ContentPart>,
}

impl ImageRequest {
    /// Creates a request from its parts.
    pub fn new(parts: Vec<ContentPart>) -> Self {
        Self { parts }
    }

    /// Counts the inline payloads in the request.
    pub fn inline_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, ContentPart::InlineData { .. }))
            .count()
    }
}

/// A hosted multimodal model.
///
/// Implementations perform exactly one network round trip per call and never
/// retry.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Runs the text model and returns its text output (may be empty).
    async fn generate_text(&self, request: &TextRequest) -> Result<String>;

    /// Runs the image model and returns the parts of the first candidate.
    async fn generate_image(&self, request: &ImageRequest) -> Result<Vec<ContentPart>>;

    /// Returns the name of this backend for display.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_inline_image() {
        assert_eq!(
            ContentPart::inline("image/png", "QUJD").as_inline_image(),
            Some("QUJD")
        );
        assert_eq!(ContentPart::inline("application/pdf", "QUJD").as_inline_image(), None);
        assert_eq!(ContentPart::text("hello").as_inline_image(), None);
    }

    #[test]
    fn test_inline_count() {
        let request = ImageRequest::new(vec![
            ContentPart::inline("image/png", "a"),
            ContentPart::inline("image/jpeg", "b"),
            ContentPart::text("task"),
        ]);
        assert_eq!(request.inline_count(), 2);
    }
}
