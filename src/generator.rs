//! Scene generation: one image-model call per request.

use crate::catalog::SceneTask;
use crate::error::{Result, StudioError};
use crate::model::{ContentPart, ImageRequest, ModelBackend};
use crate::types::{ImageAsset, SceneRequest};
use std::sync::Arc;
use std::time::Instant;

/// Sends images plus a task description to the image model.
#[derive(Clone)]
pub struct SceneGenerator {
    backend: Arc<dyn ModelBackend>,
}

impl SceneGenerator {
    /// Creates a generator over the given backend.
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self { backend }
    }

    /// Generates the scene and returns it as a `data:image/png;base64,` asset.
    ///
    /// Fails without a network call when the task needs a source image and
    /// none was given. Fails with [`StudioError::NoImageGenerated`] when the
    /// model replies without an inline image.
    pub async fn generate(&self, request: &SceneRequest) -> Result<ImageAsset> {
        let task = request.style.task();
        if task.requires_source() && request.images.is_empty() {
            return Err(StudioError::InvalidRequest(format!(
                "style '{}' needs at least one source image",
                request.style
            )));
        }

        let image_request = build_request(request);
        let start = Instant::now();

        let parts = match self.backend.generate_image(&image_request).await {
            Ok(parts) => parts,
            Err(e) => {
                tracing::error!(style = %request.style, "scene generation failed: {e}");
                return Err(e);
            }
        };

        let payload = parts
            .iter()
            .find_map(ContentPart::as_inline_image)
            .ok_or_else(|| {
                tracing::error!(style = %request.style, parts = parts.len(), "no image in model reply");
                StudioError::NoImageGenerated
            })?;

        tracing::debug!(
            style = %request.style,
            backend = self.backend.name(),
            duration_ms = start.elapsed().as_millis() as u64,
            "scene generated"
        );

        Ok(ImageAsset::png_data_uri(payload))
    }
}

fn inline_part(image: &ImageAsset) -> ContentPart {
    ContentPart::inline(image.mime_type(), image.payload())
}

fn build_request(request: &SceneRequest) -> ImageRequest {
    let task = request.style.task();
    let mut parts: Vec<ContentPart> = request.images.iter().map(inline_part).collect();

    let reference = request.reference.as_ref().filter(|_| task.accepts_reference());
    if let Some(reference) = reference {
        parts.push(inline_part(reference));
    }

    parts.push(ContentPart::text(task_description(
        task,
        request,
        reference.is_some(),
    )));
    ImageRequest::new(parts)
}

fn task_description(task: SceneTask, request: &SceneRequest, has_reference: bool) -> String {
    let SceneRequest {
        prompt,
        resolution,
        aspect_ratio,
        ..
    } = request;

    match task {
        SceneTask::Upscale => format!(
            "Task: Upscale and Enhance.\n\
             1. Upscale input to {resolution}.\n\
             2. Preserve original background EXACTLY.\n\
             3. Sharpen details and denoise.\n\
             4. Output in 8K fidelity."
        ),
        SceneTask::RemoveBackground => format!(
            "Task: Background Removal / Extraction.\n\
             1. Place the product on a pure SOLID WHITE background (#FFFFFF).\n\
             2. NO shadows, NO gradient, NO props.\n\
             3. Keep product edges perfectly sharp.\n\
             4. Maintain resolution and aspect ratio {aspect_ratio}."
        ),
        SceneTask::TextToImage => {
            let mut text = format!(
                "Task: Generate Image from Text (Concept Art / Scene Generation).\n\
                 Prompt: {prompt}\n\
                 Output Aspect Ratio: {aspect_ratio}.\n\
                 Target Resolution: {resolution}.\n\
                 Quality: Photorealistic, Highly Detailed, Cinematic, 8k Ultra HD."
            );
            if has_reference {
                text.push_str("\nStyle Reference: Use the provided image as a Style/Vibe reference.");
            }
            text
        }
        SceneTask::FileIcons3d => format!(
            "Task: Image Transformation & Style Transfer (2D to 3D).\n\
             1. ANALYZE the source image to identify file names, folder names, and icons.\n\
             2. RE-CREATE the scene as a 3D Isometric Render.\n\
             3. CRITICAL: The names of the files (text) MUST be clearly written on the 3D objects.\n\
             4. Maintain the exact spelling of filenames from the original image.\n\
             5. Prompt: {prompt}\n\
             6. Output Aspect Ratio: {aspect_ratio}.\n\
             7. Target Resolution: {resolution}."
        ),
        SceneTask::FreeEdit => format!(
            "Task: Creative Image Editing / Manipulation.\n\
             1. Modify the provided image based on the user's specific instruction: {prompt}\n\
             2. Unlike strict product photography, you have the creative freedom to change the subject, colors, or background if the prompt asks for it.\n\
             3. Maintain realism and high quality.\n\
             4. Output Aspect Ratio: {aspect_ratio}.\n\
             5. Target Resolution: {resolution}."
        ),
        SceneTask::SubjectPreserving => {
            // The reference, when sent, follows the source images.
            let reference_line = if has_reference {
                format!(
                    "Mimic the style of Image {} (the reference image).",
                    request.images.len() + 1
                )
            } else {
                "No style reference provided.".to_string()
            };
            format!(
                "Task: Background Replacement / In-Painting / Scene Generation.\n\
                 1. Keep the central subject (person or product) EXACTLY as is (Face/Product Details must not change).\n\
                 2. If multiple images are provided, use them to understand the 3D geometry of the object.\n\
                 3. Generate a new scene based on: {prompt}\n\
                 4. {reference_line}\n\
                 5. Output Aspect Ratio: {aspect_ratio}.\n\
                 6. Target Resolution: {resolution}.\n\
                 7. Ensure realistic integration (shadows/reflections) between subject and new background.\n\
                 8. Output Quality: 8k Ultra Sharp."
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StylePreset;
    use crate::model::mock::{png_reply, MockBackend};
    use crate::options::{AspectRatio, Resolution};
    use crate::types::PNG_DATA_URI_PREFIX;

    fn generator_with(mock: MockBackend) -> (SceneGenerator, Arc<MockBackend>) {
        let mock = Arc::new(mock);
        (SceneGenerator::new(mock.clone()), mock)
    }

    fn source() -> ImageAsset {
        ImageAsset::new("data:image/jpeg;base64,U09VUkNF")
    }

    fn reference() -> ImageAsset {
        ImageAsset::new("data:image/webp;base64,UkVGRVJFTkNF")
    }

    fn task_text(request: &ImageRequest) -> &str {
        match request.parts.last() {
            Some(ContentPart::Text(text)) => text,
            other => panic!("expected trailing text part, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_returns_png_data_uri() {
        let (generator, mock) = generator_with(MockBackend::new().with_image(png_reply("R0VO")));
        let request =
            SceneRequest::new("a beach at dusk", StylePreset::SmartAd).with_images(vec![source()]);

        let image = generator.generate(&request).await.unwrap();

        assert!(image.as_str().starts_with(PNG_DATA_URI_PREFIX));
        assert_eq!(image.as_str(), "data:image/png;base64,R0VO");
        assert_eq!(mock.image_call_count(), 1);
    }

    #[tokio::test]
    async fn test_fails_without_image_part() {
        let (generator, _) = generator_with(
            MockBackend::new().with_image(Ok(vec![ContentPart::text("I cannot draw that.")])),
        );
        let request = SceneRequest::new("x", StylePreset::SmartAd).with_images(vec![source()]);

        let err = generator.generate(&request).await.unwrap_err();
        assert!(matches!(err, StudioError::NoImageGenerated));
    }

    #[tokio::test]
    async fn test_fails_on_empty_reply() {
        let (generator, _) = generator_with(MockBackend::new().with_image(Ok(vec![])));
        let request = SceneRequest::new("x", StylePreset::Upscale).with_images(vec![source()]);
        assert!(matches!(
            generator.generate(&request).await,
            Err(StudioError::NoImageGenerated)
        ));
    }

    #[tokio::test]
    async fn test_uses_first_image_part() {
        let (generator, _) = generator_with(MockBackend::new().with_image(Ok(vec![
            ContentPart::text("here you go"),
            ContentPart::inline("image/png", "RklSU1Q="),
            ContentPart::inline("image/png", "U0VDT05E"),
        ])));
        let request = SceneRequest::new("x", StylePreset::SmartAd).with_images(vec![source()]);
        let image = generator.generate(&request).await.unwrap();
        assert_eq!(image.payload(), "RklSU1Q=");
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let (generator, _) = generator_with(MockBackend::new().with_image(Err(
            StudioError::RateLimited { retry_after: None },
        )));
        let request = SceneRequest::new("x", StylePreset::SmartAd).with_images(vec![source()]);
        assert!(matches!(
            generator.generate(&request).await,
            Err(StudioError::RateLimited { .. })
        ));
    }

    #[tokio::test]
    async fn test_strips_prefix_and_keeps_mime() {
        let (generator, mock) = generator_with(MockBackend::new().with_image(png_reply("T1VU")));
        let request = SceneRequest::new("x", StylePreset::SmartAd)
            .with_images(vec![source(), ImageAsset::new("data:image/png;base64,U0lERQ==")]);

        generator.generate(&request).await.unwrap();

        let sent = mock.last_image_call();
        assert_eq!(sent.parts[0], ContentPart::inline("image/jpeg", "U09VUkNF"));
        assert_eq!(sent.parts[1], ContentPart::inline("image/png", "U0lERQ=="));
        assert_eq!(sent.parts.len(), 3);
    }

    #[tokio::test]
    async fn test_remove_bg_drops_reference() {
        let (generator, mock) = generator_with(MockBackend::new().with_image(png_reply("T1VU")));
        let request = SceneRequest::new("ignored", StylePreset::RemoveBg)
            .with_images(vec![source()])
            .with_reference(Some(reference()))
            .with_aspect_ratio(AspectRatio::Portrait);

        generator.generate(&request).await.unwrap();

        let sent = mock.last_image_call();
        assert_eq!(sent.inline_count(), 1);
        assert!(!sent
            .parts
            .contains(&ContentPart::inline("image/webp", "UkVGRVJFTkNF")));
        let task = task_text(&sent);
        assert!(task.starts_with("Task: Background Removal / Extraction."));
        assert!(task.contains(AspectRatio::Portrait.label()));
    }

    #[tokio::test]
    async fn test_reference_appended_after_sources() {
        let (generator, mock) = generator_with(MockBackend::new().with_image(png_reply("T1VU")));
        let request = SceneRequest::new("marble counter", StylePreset::Luxury)
            .with_images(vec![source()])
            .with_reference(Some(reference()));

        generator.generate(&request).await.unwrap();

        let sent = mock.last_image_call();
        assert_eq!(sent.inline_count(), 2);
        assert_eq!(sent.parts[1], ContentPart::inline("image/webp", "UkVGRVJFTkNF"));
        let task = task_text(&sent);
        assert!(task.contains("Generate a new scene based on: marble counter"));
        assert!(task.contains("Mimic the style of Image 2"));
        assert!(task.contains("Keep the central subject"));
    }

    #[tokio::test]
    async fn test_requires_source_image() {
        let (generator, mock) = generator_with(MockBackend::new());
        let request = SceneRequest::new("x", StylePreset::FreeEdit);

        let err = generator.generate(&request).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(mock.image_call_count(), 0);
    }

    #[tokio::test]
    async fn test_text_to_image_without_sources() {
        let (generator, mock) = generator_with(MockBackend::new().with_image(png_reply("T1VU")));
        let request = SceneRequest::new("a neon forest", StylePreset::Imagine)
            .with_reference(Some(reference()))
            .with_resolution(Resolution::Uhd);

        generator.generate(&request).await.unwrap();

        let sent = mock.last_image_call();
        assert_eq!(sent.inline_count(), 1);
        let task = task_text(&sent);
        assert!(task.contains("Prompt: a neon forest"));
        assert!(task.contains(Resolution::Uhd.label()));
        assert!(task.contains("Style Reference: Use the provided image"));
    }

    #[test]
    fn test_task_descriptions_per_task() {
        let cases = [
            (StylePreset::Upscale, "Task: Upscale and Enhance."),
            (StylePreset::Files3dRender, "Task: Image Transformation & Style Transfer (2D to 3D)."),
            (StylePreset::FreeEdit, "Task: Creative Image Editing / Manipulation."),
            (StylePreset::PureCreation, "Task: Generate Image from Text"),
            (StylePreset::DeveloperPro, "Task: Background Replacement / In-Painting"),
        ];
        for (style, heading) in cases {
            let request = SceneRequest::new("p", style).with_images(vec![source()]);
            let built = build_request(&request);
            assert!(task_text(&built).starts_with(heading), "{style}");
        }
    }
}
