//! Core value types: image payloads, generation settings, analysis results.

use crate::catalog::StylePreset;
use crate::error::{Result, StudioError};
use crate::options::{
    AspectRatio, CameraAngle, CameraDistance, FaceDirection, LightingPreset, Resolution,
    SubjectPose,
};
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Prefix put on every generated image.
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Image encodings accepted in data URIs and recognised by content sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    /// PNG; also the fallback when nothing else matches.
    #[default]
    Png,
    /// JPEG.
    Jpeg,
    /// WebP.
    WebP,
}

impl ImageFormat {
    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Maps the subtype of a `data:image/<subtype>;base64,` prefix.
    pub fn from_data_uri_subtype(subtype: &str) -> Option<Self> {
        match subtype {
            "png" => Some(Self::Png),
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Sniffs the format from the leading bytes of an image.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";
        const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF];

        match data {
            d if d.starts_with(PNG) => Some(Self::Png),
            d if d.starts_with(JPEG) => Some(Self::Jpeg),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::WebP),
            _ => None,
        }
    }
}

/// A base64 image payload, optionally carrying a `data:image/...;base64,` prefix.
///
/// Assets are cheap to clone and never decoded unless asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    raw: String,
}

impl ImageAsset {
    /// Wraps a base64 string or data URI as-is.
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Wraps a bare base64 PNG payload as a `data:image/png;base64,` URI.
    pub fn png_data_uri(payload: &str) -> Self {
        Self::new(format!("{PNG_DATA_URI_PREFIX}{payload}"))
    }

    /// Encodes raw image bytes as a data URI, detecting the format.
    pub fn from_bytes(data: &[u8]) -> Self {
        let format = ImageFormat::from_magic_bytes(data).unwrap_or_default();
        let payload = base64::engine::general_purpose::STANDARD.encode(data);
        Self::new(format!("data:{};base64,{}", format.mime_type(), payload))
    }

    /// Reads an image file into a data URI.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self::from_bytes(&data))
    }

    /// Returns the string exactly as supplied.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the MIME type named by the data URI prefix, if one is present.
    pub fn declared_mime_type(&self) -> Option<&'static str> {
        split_data_uri(&self.raw).map(|(format, _)| format.mime_type())
    }

    /// Returns the base64 payload with any recognised data URI prefix stripped.
    pub fn payload(&self) -> &str {
        split_data_uri(&self.raw)
            .map(|(_, payload)| payload)
            .unwrap_or(&self.raw)
    }

    /// Returns the MIME type to send: from the prefix, else sniffed, else PNG.
    pub fn mime_type(&self) -> &'static str {
        if let Some(mime) = self.declared_mime_type() {
            return mime;
        }
        // 16 base64 chars decode to the 12 bytes the magic check needs.
        let head: String = self.payload().chars().take(16).collect();
        base64::engine::general_purpose::STANDARD
            .decode(head)
            .ok()
            .and_then(|bytes| ImageFormat::from_magic_bytes(&bytes))
            .unwrap_or_default()
            .mime_type()
    }

    /// Returns the asset as a PNG data URI around the same payload.
    pub fn to_png_data_uri(&self) -> String {
        format!("{PNG_DATA_URI_PREFIX}{}", self.payload())
    }

    /// Decodes the payload to raw bytes.
    ///
    /// Tolerates embedded whitespace and missing padding.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let cleaned: String = self
            .payload()
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();

        if let Ok(data) = base64::engine::general_purpose::STANDARD.decode(&cleaned) {
            return Ok(data);
        }

        base64::engine::general_purpose::STANDARD_NO_PAD
            .decode(cleaned.trim_end_matches('='))
            .map_err(|e| StudioError::Decode(e.to_string()))
    }

    /// Decodes the payload and writes it to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.decode()?)?;
        Ok(())
    }
}

impl std::fmt::Display for ImageAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<String> for ImageAsset {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

/// Splits `data:image/<png|jpeg|jpg|webp>;base64,<payload>`.
fn split_data_uri(raw: &str) -> Option<(ImageFormat, &str)> {
    let rest = raw.strip_prefix("data:image/")?;
    let (subtype, payload) = rest.split_once(";base64,")?;
    Some((ImageFormat::from_data_uri_subtype(subtype)?, payload))
}

/// Everything the user selected for one generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Free-text instruction from the user (any language).
    #[serde(default)]
    pub prompt: String,
    /// Mandatory content that must appear in or survive the output.
    #[serde(default)]
    pub fixed_elements: String,
    /// Style preset.
    #[serde(default)]
    pub style: StylePreset,
    /// Camera angle.
    #[serde(default)]
    pub angle: CameraAngle,
    /// Camera distance.
    #[serde(default)]
    pub distance: CameraDistance,
    /// Lighting preset.
    #[serde(default)]
    pub lighting: LightingPreset,
    /// Subject pose.
    #[serde(default)]
    pub pose: SubjectPose,
    /// Face direction.
    #[serde(default)]
    pub face_direction: FaceDirection,
    /// Output resolution.
    #[serde(default)]
    pub resolution: Resolution,
    /// Output aspect ratio.
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    /// Solid background color as a hex string (e.g. `#1E293B`).
    #[serde(default, deserialize_with = "blank_as_none")]
    pub background_color: Option<String>,
}

impl GenerationConfig {
    /// Creates a configuration for the given style with default options.
    pub fn new(style: StylePreset) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    /// Sets the free-text instruction.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Sets the mandatory elements clause.
    pub fn with_fixed_elements(mut self, fixed: impl Into<String>) -> Self {
        self.fixed_elements = fixed.into();
        self
    }

    /// Sets the camera angle.
    pub fn with_angle(mut self, angle: CameraAngle) -> Self {
        self.angle = angle;
        self
    }

    /// Sets the camera distance.
    pub fn with_distance(mut self, distance: CameraDistance) -> Self {
        self.distance = distance;
        self
    }

    /// Sets the lighting preset.
    pub fn with_lighting(mut self, lighting: LightingPreset) -> Self {
        self.lighting = lighting;
        self
    }

    /// Sets the subject pose.
    pub fn with_pose(mut self, pose: SubjectPose) -> Self {
        self.pose = pose;
        self
    }

    /// Sets the face direction.
    pub fn with_face_direction(mut self, face_direction: FaceDirection) -> Self {
        self.face_direction = face_direction;
        self
    }

    /// Sets the output resolution.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Sets the output aspect ratio.
    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Sets a solid background color. Empty strings clear it.
    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        let color = color.into();
        self.background_color = if color.trim().is_empty() {
            None
        } else {
            Some(color.trim().to_string())
        };
        self
    }

    /// Checks fields the type system can't: the background color format.
    pub fn validate(&self) -> Result<()> {
        if let Some(color) = &self.background_color {
            if !is_hex_color(color) {
                return Err(StudioError::InvalidRequest(format!(
                    "background color must be #RGB or #RRGGBB, got '{color}'"
                )));
            }
        }
        Ok(())
    }
}

/// Same rule as [`GenerationConfig::with_background_color`]: blank clears.
fn blank_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let color = Option::<String>::deserialize(deserializer)?;
    Ok(color
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty()))
}

fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Input to the scene generator.
#[derive(Debug, Clone)]
pub struct SceneRequest {
    /// Source images (one or more views of the subject).
    pub images: Vec<ImageAsset>,
    /// Optional style/vibe reference.
    pub reference: Option<ImageAsset>,
    /// Composed English prompt.
    pub prompt: String,
    /// Target resolution.
    pub resolution: Resolution,
    /// Style preset; selects the task description.
    pub style: StylePreset,
    /// Output aspect ratio.
    pub aspect_ratio: AspectRatio,
}

impl SceneRequest {
    /// Creates a request with default resolution and aspect ratio.
    pub fn new(prompt: impl Into<String>, style: StylePreset) -> Self {
        Self {
            images: Vec::new(),
            reference: None,
            prompt: prompt.into(),
            resolution: Resolution::default(),
            style,
            aspect_ratio: AspectRatio::default(),
        }
    }

    /// Builds a request from a configuration and an already-composed prompt.
    pub fn from_config(config: &GenerationConfig, prompt: impl Into<String>) -> Self {
        Self::new(prompt, config.style)
            .with_resolution(config.resolution)
            .with_aspect_ratio(config.aspect_ratio)
    }

    /// Sets the source images.
    pub fn with_images(mut self, images: Vec<ImageAsset>) -> Self {
        self.images = images;
        self
    }

    /// Sets the reference image.
    pub fn with_reference(mut self, reference: Option<ImageAsset>) -> Self {
        self.reference = reference;
        self
    }

    /// Sets the target resolution.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Sets the aspect ratio.
    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }
}

/// Prompts derived from an existing image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysisResult {
    /// Describes the whole image so it can be recreated from scratch.
    pub creation_prompt: String,
    /// Describes only the primary subject, to keep it unchanged during edits.
    pub preservation_prompt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
    const WEBP_MAGIC: [u8; 12] = *b"RIFF\x00\x00\x00\x00WEBP";

    #[test]
    fn test_format_from_magic_bytes() {
        assert_eq!(ImageFormat::from_magic_bytes(&PNG_MAGIC), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_magic_bytes(&JPEG_MAGIC), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic_bytes(&WEBP_MAGIC), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::from_magic_bytes(b"short"), None);
        assert_eq!(ImageFormat::from_magic_bytes(b"RIFF\0\0\0\0WAVE"), None);
    }

    #[test]
    fn test_format_from_data_uri_subtype() {
        assert_eq!(ImageFormat::from_data_uri_subtype("jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_data_uri_subtype("webp"), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::from_data_uri_subtype("gif"), None);
        assert_eq!(ImageFormat::default().mime_type(), "image/png");
    }

    #[test]
    fn test_payload_strips_known_prefixes() {
        for prefix in [
            "data:image/png;base64,",
            "data:image/jpeg;base64,",
            "data:image/jpg;base64,",
            "data:image/webp;base64,",
        ] {
            let asset = ImageAsset::new(format!("{prefix}QUJD"));
            assert_eq!(asset.payload(), "QUJD", "prefix {prefix}");
        }
    }

    #[test]
    fn test_payload_keeps_unknown_prefix() {
        let asset = ImageAsset::new("data:image/gif;base64,QUJD");
        assert_eq!(asset.payload(), "data:image/gif;base64,QUJD");

        let bare = ImageAsset::new("QUJD");
        assert_eq!(bare.payload(), "QUJD");
        assert_eq!(bare.declared_mime_type(), None);
    }

    #[test]
    fn test_strip_and_readd_prefix_round_trip() {
        let original = ImageAsset::from_bytes(&PNG_MAGIC);
        let rebuilt = ImageAsset::png_data_uri(original.payload());
        assert!(rebuilt.as_str().starts_with(PNG_DATA_URI_PREFIX));
        assert_eq!(rebuilt.payload(), original.payload());
        assert_eq!(rebuilt.decode().unwrap(), PNG_MAGIC.to_vec());

        // A JPEG re-wrapped as PNG still carries the same bytes.
        let jpeg = ImageAsset::from_bytes(&JPEG_MAGIC);
        assert_eq!(jpeg.declared_mime_type(), Some("image/jpeg"));
        let rewrapped = ImageAsset::new(jpeg.to_png_data_uri());
        assert_eq!(rewrapped.decode().unwrap(), JPEG_MAGIC.to_vec());
    }

    #[test]
    fn test_mime_type_detection() {
        let declared = ImageAsset::from_bytes(&WEBP_MAGIC);
        assert_eq!(declared.mime_type(), "image/webp");

        let sniffed = ImageAsset::new(ImageAsset::from_bytes(&JPEG_MAGIC).payload().to_string());
        assert_eq!(sniffed.mime_type(), "image/jpeg");

        let unknown = ImageAsset::new("not-base64!!");
        assert_eq!(unknown.mime_type(), "image/png");
    }

    #[test]
    fn test_decode_lenient() {
        let asset = ImageAsset::new("data:image/png;base64,SGVs\nbG8");
        assert_eq!(asset.decode().unwrap(), b"Hello");

        let padded = ImageAsset::new("SGVsbG8=");
        assert_eq!(padded.decode().unwrap(), b"Hello");

        let bad = ImageAsset::new("***");
        assert!(matches!(bad.decode(), Err(StudioError::Decode(_))));
    }

    #[test]
    fn test_config_builder() {
        let config = GenerationConfig::new(StylePreset::FashionClothing)
            .with_prompt("red dress")
            .with_pose(SubjectPose::FashionWalk)
            .with_aspect_ratio(AspectRatio::Story)
            .with_background_color("  #FFAA00 ");

        assert_eq!(config.style, StylePreset::FashionClothing);
        assert_eq!(config.prompt, "red dress");
        assert_eq!(config.angle, CameraAngle::EyeLevel);
        assert_eq!(config.background_color.as_deref(), Some("#FFAA00"));
        assert!(config.validate().is_ok());

        let cleared = config.with_background_color("");
        assert_eq!(cleared.background_color, None);
    }

    #[test]
    fn test_config_rejects_bad_color() {
        let config = GenerationConfig::default().with_background_color("red");
        assert!(matches!(config.validate(), Err(StudioError::InvalidRequest(_))));

        let short = GenerationConfig::default().with_background_color("#fff");
        assert!(short.validate().is_ok());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: GenerationConfig =
            serde_json::from_str(r#"{"style": "remove-bg", "angle": "top-down"}"#).unwrap();
        assert_eq!(config.style, StylePreset::RemoveBg);
        assert_eq!(config.angle, CameraAngle::TopDown);
        assert_eq!(config.lighting, LightingPreset::Softbox);
        assert!(config.prompt.is_empty());
    }

    #[test]
    fn test_config_blank_background_deserializes_as_none() {
        for body in [
            r#"{"background_color": ""}"#,
            r#"{"background_color": "   "}"#,
            r#"{"background_color": null}"#,
        ] {
            let config: GenerationConfig = serde_json::from_str(body).unwrap();
            assert_eq!(config.background_color, None, "{body}");
            assert!(config.validate().is_ok(), "{body}");
        }

        let config: GenerationConfig =
            serde_json::from_str(r##"{"background_color": " #101010 "}"##).unwrap();
        assert_eq!(config.background_color.as_deref(), Some("#101010"));
    }

    #[test]
    fn test_scene_request_from_config() {
        let config = GenerationConfig::new(StylePreset::Upscale)
            .with_resolution(Resolution::Uhd)
            .with_aspect_ratio(AspectRatio::Wide);
        let request = SceneRequest::from_config(&config, "prompt");
        assert_eq!(request.style, StylePreset::Upscale);
        assert_eq!(request.resolution, Resolution::Uhd);
        assert_eq!(request.aspect_ratio, AspectRatio::Wide);
        assert!(request.images.is_empty());
    }
}
