//! Image analysis: derive recreation and preservation prompts from an image.

use crate::error::{Result, StudioError};
use crate::model::{ContentPart, ModelBackend, TextRequest};
use crate::types::{ImageAnalysisResult, ImageAsset};
use serde_json::{json, Value};
use std::sync::Arc;

/// Substituted when the model omits the creation prompt.
pub const MISSING_CREATION_PROMPT: &str = "Could not generate prompt.";
/// Substituted when the model omits the preservation prompt.
pub const MISSING_PRESERVATION_PROMPT: &str = "Could not identify subject.";

const ANALYSIS_INSTRUCTION: &str = r#"You are an AI Vision Expert for Photography.
Analyze the provided image and output a JSON object with exactly two fields:

1. "creationPrompt": A highly detailed, artistic English prompt that describes the image perfectly so it can be re-created by an AI generator from scratch. Include lighting, angle, mood, colors, and subject details.

2. "preservationPrompt": A precise English description of the PRIMARY SUBJECT ONLY. This text will be used to tell an AI what NOT to change during an edit. Focus on the subject's physical traits, clothing, or product details."#;

/// Asks the vision model to describe an image.
#[derive(Clone)]
pub struct ImageAnalyzer {
    backend: Arc<dyn ModelBackend>,
}

impl ImageAnalyzer {
    /// Creates an analyzer over the given backend.
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self { backend }
    }

    /// Analyzes the first image in `images`.
    ///
    /// Missing fields in the reply become placeholder strings; only an empty
    /// image list, a transport failure, or a body that is not JSON fail.
    pub async fn analyze(&self, images: &[ImageAsset]) -> Result<ImageAnalysisResult> {
        let image = images
            .first()
            .ok_or_else(|| StudioError::InvalidRequest("No image provided for analysis.".into()))?;

        let request = TextRequest::new(ANALYSIS_INSTRUCTION)
            .with_part(ContentPart::inline(image.mime_type(), image.payload()))
            .with_part(ContentPart::text(
                "Analyze this image and provide the JSON output.",
            ))
            .with_response_schema(analysis_schema());

        let text = match self.backend.generate_text(&request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(backend = self.backend.name(), "image analysis failed: {e}");
                return Err(e);
            }
        };

        parse_analysis(&text).map_err(|e| {
            tracing::error!("unparseable analysis reply: {e}");
            e
        })
    }
}

fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "creationPrompt": { "type": "STRING" },
            "preservationPrompt": { "type": "STRING" }
        },
        "required": ["creationPrompt", "preservationPrompt"]
    })
}

/// Only a body that is not JSON at all is an error; wrong or missing fields
/// fall back to placeholders.
fn parse_analysis(text: &str) -> Result<ImageAnalysisResult> {
    let body = if text.trim().is_empty() { "{}" } else { text };
    let value: Value = serde_json::from_str(body)?;

    Ok(ImageAnalysisResult {
        creation_prompt: string_field(&value, "creationPrompt", MISSING_CREATION_PROMPT),
        preservation_prompt: string_field(&value, "preservationPrompt", MISSING_PRESERVATION_PROMPT),
    })
}

fn string_field(value: &Value, name: &str, placeholder: &str) -> String {
    value
        .get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(placeholder)
        .to_string()
}
