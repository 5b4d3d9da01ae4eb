//! Gemini (Google) `generateContent` backend.

use crate::error::{parse_retry_after, sanitize_error_message, Result, StudioError};
use crate::model::{ContentPart, ImageRequest, ModelBackend, TextRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini text (and vision) model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiTextModel {
    /// Gemini 2.5 Flash (fast, economical).
    #[default]
    Flash,
    /// Gemini 2.5 Pro.
    Pro,
}

impl GeminiTextModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flash => "gemini-2.5-flash",
            Self::Pro => "gemini-2.5-pro",
        }
    }
}

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiImageModel {
    /// Nano Banana - Gemini 2.5 Flash Image.
    #[default]
    NanoBanana,
    /// Nano Banana Pro - Gemini 3 Pro Image.
    NanoBananaPro,
}

impl GeminiImageModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NanoBanana => "gemini-2.5-flash-image",
            Self::NanoBananaPro => "gemini-3-pro-image-preview",
        }
    }
}

/// Builder for [`GeminiBackend`].
#[derive(Debug, Clone, Default)]
pub struct GeminiBackendBuilder {
    api_key: Option<String>,
    text_model: GeminiTextModel,
    image_model: GeminiImageModel,
    base_url: Option<String>,
}

impl GeminiBackendBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY`, then `API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the model used for prompt optimization and analysis.
    pub fn text_model(mut self, model: GeminiTextModel) -> Self {
        self.text_model = model;
        self
    }

    /// Sets the model used for scene generation.
    pub fn image_model(mut self, model: GeminiImageModel) -> Self {
        self.image_model = model;
        self
    }

    /// Overrides the API root (for proxies and gateways).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the backend, resolving the API key.
    pub fn build(self) -> Result<GeminiBackend> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .or_else(|| std::env::var("API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                StudioError::Auth("GOOGLE_API_KEY not set and no API key provided".into())
            })?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(GeminiBackend {
            client: reqwest::Client::new(),
            api_key,
            text_model: self.text_model,
            image_model: self.image_model,
            base_url,
        })
    }
}

/// Gemini backend over the REST API.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    text_model: GeminiTextModel,
    image_model: GeminiImageModel,
    base_url: String,
}

impl GeminiBackend {
    /// Creates a new `GeminiBackendBuilder`.
    pub fn builder() -> GeminiBackendBuilder {
        GeminiBackendBuilder::new()
    }

    /// Returns the text model in use.
    pub fn text_model(&self) -> GeminiTextModel {
        self.text_model
    }

    /// Returns the image model in use.
    pub fn image_model(&self) -> GeminiImageModel {
        self.image_model
    }

    /// Checks that the image model is reachable and the key is accepted.
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/models/{}", self.base_url, self.image_model.as_str());

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        match response.status().as_u16() {
            401 | 403 => Err(StudioError::Auth("Invalid API key".into())),
            404 => Err(StudioError::InvalidRequest(
                "Model not found. Verify the model name is correct.".into(),
            )),
            s if !(200..300).contains(&s) => Err(StudioError::Api {
                status: s,
                message: "Health check failed".into(),
            }),
            _ => Ok(()),
        }
    }

    async fn generate_content(&self, model: &str, body: &GeminiRequest) -> Result<GeminiCandidate> {
        let start = Instant::now();
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        tracing::debug!(model, parts = body.part_count(), "sending Gemini request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        let gemini_response: GeminiResponse = response.json().await?;

        tracing::debug!(
            model,
            duration_ms = start.elapsed().as_millis() as u64,
            "Gemini request complete"
        );

        gemini_response.into_first_candidate()
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    async fn generate_text(&self, request: &TextRequest) -> Result<String> {
        let body = GeminiRequest::from_text_request(request);
        let candidate = self.generate_content(self.text_model.as_str(), &body).await?;
        Ok(candidate.text())
    }

    async fn generate_image(&self, request: &ImageRequest) -> Result<Vec<ContentPart>> {
        let body = GeminiRequest::from_image_request(request);
        let candidate = self.generate_content(self.image_model.as_str(), &body).await?;
        Ok(candidate.into_parts())
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }
}

fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> StudioError {
    let message = extract_error_message(text);
    let message = sanitize_error_message(&message);
    if status == 404 {
        return StudioError::InvalidRequest(
            "Model not found. Verify the model name is correct.".into(),
        );
    }
    if status == 429 {
        let retry_after = parse_retry_after(headers).map(std::time::Duration::from_secs);
        return StudioError::RateLimited { retry_after };
    }
    if status == 401 || status == 403 {
        return StudioError::Auth(message);
    }
    let lower = message.to_lowercase();
    if lower.contains("safety") || lower.contains("blocked") || lower.contains("prohibited") {
        return StudioError::ContentBlocked(message);
    }
    StudioError::Api { status, message }
}

/// Pulls `error.message` out of a Google error body, else returns the body.
fn extract_error_message(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| text.to_string())
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - can be text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

impl From<&ContentPart> for GeminiRequestPart {
    fn from(part: &ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => Self::Text { text: text.clone() },
            ContentPart::InlineData { mime_type, data } => Self::InlineData {
                inline_data: InlineData {
                    mime_type: mime_type.clone(),
                    data: data.clone(),
                },
            },
        }
    }
}

impl GeminiRequest {
    fn from_text_request(req: &TextRequest) -> Self {
        let system_instruction = Some(GeminiContent {
            parts: vec![GeminiRequestPart::Text {
                text: req.system_instruction.clone(),
            }],
        })
        .filter(|_| !req.system_instruction.trim().is_empty());

        let generation_config = match &req.response_schema {
            Some(schema) => GeminiConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(schema.clone()),
                ..Default::default()
            },
            None => GeminiConfig::default(),
        };

        Self {
            system_instruction,
            contents: vec![GeminiContent {
                parts: req.parts.iter().map(GeminiRequestPart::from).collect(),
            }],
            generation_config,
        }
    }

    fn from_image_request(req: &ImageRequest) -> Self {
        Self {
            system_instruction: None,
            contents: vec![GeminiContent {
                parts: req.parts.iter().map(GeminiRequestPart::from).collect(),
            }],
            generation_config: GeminiConfig {
                response_modalities: Some(vec!["IMAGE".to_string()]),
                ..Default::default()
            },
        }
    }

    fn part_count(&self) -> usize {
        self.contents.iter().map(|c| c.parts.len()).sum()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

impl GeminiResponse {
    /// Checks block signals (returned as HTTP 200) and takes the first candidate.
    fn into_first_candidate(self) -> Result<GeminiCandidate> {
        if let Some(ref feedback) = self.prompt_feedback {
            if let Some(ref reason) = feedback.block_reason {
                let msg = feedback
                    .block_reason_message
                    .clone()
                    .unwrap_or_else(|| format!("Prompt blocked: {}", reason));
                return Err(StudioError::ContentBlocked(msg));
            }
        }

        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            StudioError::UnexpectedResponse("No candidates in Gemini response".into())
        })?;

        if let Some(ref finish_reason) = candidate.finish_reason {
            match finish_reason.as_str() {
                "SAFETY"
                | "IMAGE_SAFETY"
                | "IMAGE_PROHIBITED_CONTENT"
                | "IMAGE_RECITATION"
                | "RECITATION"
                | "PROHIBITED_CONTENT"
                | "BLOCKLIST" => {
                    return Err(StudioError::ContentBlocked(format!(
                        "Content blocked by Gemini safety filter: {}",
                        finish_reason
                    )));
                }
                _ => {} // STOP, MAX_TOKENS, NO_IMAGE etc. are judged by the caller
            }
        }

        Ok(candidate)
    }
}

impl GeminiCandidate {
    fn text(&self) -> String {
        self.content
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }

    fn into_parts(self) -> Vec<ContentPart> {
        self.content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| match (p.inline_data, p.text) {
                (Some(inline), _) => Some(ContentPart::InlineData {
                    mime_type: inline.mime_type,
                    data: inline.data,
                }),
                (None, Some(text)) => Some(ContentPart::Text(text)),
                (None, None) => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_model_as_str() {
        assert_eq!(GeminiTextModel::Flash.as_str(), "gemini-2.5-flash");
        assert_eq!(GeminiImageModel::NanoBanana.as_str(), "gemini-2.5-flash-image");
        assert_eq!(GeminiImageModel::default(), GeminiImageModel::NanoBanana);
    }

    #[test]
    fn test_builder_with_explicit_key() {
        let backend = GeminiBackendBuilder::new()
            .api_key("test-key")
            .image_model(GeminiImageModel::NanoBananaPro)
            .base_url("http://localhost:8080/v1beta/")
            .build()
            .unwrap();
        assert_eq!(backend.base_url, "http://localhost:8080/v1beta");
        assert_eq!(backend.image_model(), GeminiImageModel::NanoBananaPro);
        assert_eq!(backend.text_model(), GeminiTextModel::Flash);
    }

    #[test]
    fn test_image_request_serialization() {
        let req = ImageRequest::new(vec![
            ContentPart::inline("image/png", "QUJD"),
            ContentPart::text("Task: Upscale"),
        ]);
        let json = serde_json::to_value(GeminiRequest::from_image_request(&req)).unwrap();

        assert_eq!(
            json,
            json!({
                "contents": [{
                    "parts": [
                        { "inlineData": { "mimeType": "image/png", "data": "QUJD" } },
                        { "text": "Task: Upscale" }
                    ]
                }],
                "generationConfig": { "responseModalities": ["IMAGE"] }
            })
        );
    }

    #[test]
    fn test_text_request_serialization_with_schema() {
        let schema = json!({ "type": "OBJECT" });
        let req = TextRequest::new("Be helpful.")
            .with_part(ContentPart::text("Hi"))
            .with_response_schema(schema.clone());
        let json = serde_json::to_value(GeminiRequest::from_text_request(&req)).unwrap();

        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Be helpful.");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Hi");
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["generationConfig"]["responseSchema"], schema);
        assert!(json["generationConfig"].get("responseModalities").is_none());
    }

    #[test]
    fn test_text_request_without_instruction_omits_it() {
        let req = TextRequest::new("  ").with_part(ContentPart::text("Hi"));
        let json = serde_json::to_value(GeminiRequest::from_text_request(&req)).unwrap();
        assert!(json.get("systemInstruction").is_none());
        assert_eq!(json["generationConfig"], json!({}));
    }

    #[test]
    fn test_response_parts_conversion() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is your image" },
                        { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgo=" } }
                    ]
                },
                "finishReason": "STOP"
            }]
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        let parts = resp.into_first_candidate().unwrap().into_parts();
        assert_eq!(
            parts,
            vec![
                ContentPart::text("Here is your image"),
                ContentPart::inline("image/png", "iVBORw0KGgo="),
            ]
        );
    }

    #[test]
    fn test_response_text_joins_parts() {
        let json = r#"{
            "candidates": [{
                "content": { "parts": [{ "text": "eye level, " }, { "text": "softbox" }] }
            }]
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.into_first_candidate().unwrap().text(), "eye level, softbox");
    }

    #[test]
    fn test_response_with_prompt_feedback_block() {
        let json = r#"{
            "candidates": [],
            "promptFeedback": {
                "blockReason": "SAFETY",
                "blockReasonMessage": "Prompt was blocked due to safety"
            }
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        match resp.into_first_candidate() {
            Err(StudioError::ContentBlocked(msg)) => {
                assert_eq!(msg, "Prompt was blocked due to safety")
            }
            other => panic!("expected ContentBlocked, got {other:?}"),
        }
    }

    #[test]
    fn test_response_safety_finish_reason() {
        let json = r#"{ "candidates": [{ "finishReason": "IMAGE_SAFETY" }] }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            resp.into_first_candidate(),
            Err(StudioError::ContentBlocked(_))
        ));
    }

    #[test]
    fn test_response_without_candidates() {
        let resp: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            resp.into_first_candidate(),
            Err(StudioError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_no_image_finish_reason_yields_empty_parts() {
        let json = r#"{ "candidates": [{ "finishReason": "NO_IMAGE" }] }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        assert!(resp.into_first_candidate().unwrap().into_parts().is_empty());
    }

    #[test]
    fn test_parse_error_mapping() {
        let headers = reqwest::header::HeaderMap::new();
        let body = r#"{"error": {"code": 400, "message": "Request contains an invalid argument."}}"#;

        match parse_error(400, body, &headers) {
            StudioError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Request contains an invalid argument.");
            }
            other => panic!("expected Api, got {other:?}"),
        }
        assert!(matches!(parse_error(403, "denied", &headers), StudioError::Auth(_)));
        assert!(matches!(
            parse_error(404, "", &headers),
            StudioError::InvalidRequest(_)
        ));
        assert!(matches!(
            parse_error(429, "", &headers),
            StudioError::RateLimited { retry_after: None }
        ));
        assert!(matches!(
            parse_error(400, "prompt blocked by safety", &headers),
            StudioError::ContentBlocked(_)
        ));
    }
}
