//! Prompt composition.
//!
//! Turns a [`GenerationConfig`] into the English instruction sent to the image
//! model. Styles with a [`PromptTreatment::Fixed`], [`PromptTreatment::Creative`]
//! or [`PromptTreatment::Template`] treatment are rendered locally; everything
//! else goes through the remote text model, with a deterministic fallback when
//! that call fails.

use crate::catalog::{PromptTreatment, StylePreset};
use crate::model::{ContentPart, ModelBackend, TextRequest};
use crate::options::CameraAngle;
use crate::types::GenerationConfig;
use std::sync::Arc;

/// Builds prompts, calling the remote optimizer for open-ended styles.
#[derive(Clone)]
pub struct PromptComposer {
    backend: Arc<dyn ModelBackend>,
}

impl PromptComposer {
    /// Creates a composer over the given backend.
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self { backend }
    }

    /// Composes the prompt for `config`.
    ///
    /// Never fails and never returns an empty string: a failed optimizer call
    /// degrades to [`fallback_prompt`].
    pub async fn compose(&self, config: &GenerationConfig, has_reference: bool) -> String {
        match config.style.treatment() {
            PromptTreatment::Fixed(prompt) => prompt.to_string(),
            PromptTreatment::Creative | PromptTreatment::Template => render_template(config),
            PromptTreatment::Optimized => self.optimize(config, has_reference).await,
        }
    }

    async fn optimize(&self, config: &GenerationConfig, has_reference: bool) -> String {
        let request = TextRequest::new(optimizer_instruction(config, has_reference))
            .with_part(ContentPart::text("Optimize prompt."));

        match self.backend.generate_text(&request).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                tracing::warn!(style = %config.style, "optimizer returned no text, using fallback prompt");
                fallback_prompt(config)
            }
            Err(e) => {
                tracing::warn!(style = %config.style, "prompt optimization failed, using fallback prompt: {e}");
                fallback_prompt(config)
            }
        }
    }
}

/// The prompt used when the remote optimizer is unavailable.
pub fn fallback_prompt(config: &GenerationConfig) -> String {
    format!(
        "{}, {}, {}, {}, {}, 8k Resolution",
        config.angle,
        config.distance,
        config.lighting,
        config.pose,
        config.style.prompt_suffix()
    )
}

fn constraint_clause(config: &GenerationConfig) -> Option<String> {
    let fixed = config.fixed_elements.trim();
    (!fixed.is_empty()).then(|| format!("MANDATORY ELEMENTS (Must be included/preserved): {fixed}"))
}

fn topic_or<'a>(config: &'a GenerationConfig, default: &'a str) -> &'a str {
    let text = config.prompt.trim();
    if text.is_empty() {
        default
    } else {
        text
    }
}

/// Line-oriented prompt builder; the constraint line is omitted when empty.
struct Template {
    lines: Vec<String>,
}

impl Template {
    fn new(first: impl Into<String>, config: &GenerationConfig) -> Self {
        let mut lines = vec![first.into()];
        lines.extend(constraint_clause(config));
        Self { lines }
    }

    fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    fn build(self) -> String {
        self.lines.join("\n")
    }
}

fn render_template(config: &GenerationConfig) -> String {
    let GenerationConfig {
        angle,
        distance,
        lighting,
        pose,
        face_direction,
        aspect_ratio,
        ..
    } = config;

    match config.style {
        StylePreset::Imagine => {
            let topic = topic_or(config, "Future Technology");
            Template::new(
                format!("Create a mind-bending, futuristic, high-tech masterpiece concept art based on the concept: \"{topic}\"."),
                config,
            )
            .line("Style: Unreal Engine 5, 8k Resolution, Cyberpunk/Sci-Fi Aesthetic, Volumetric Lighting, Neon Glow.")
            .line("Details: Intricate mechanical details, futuristic architecture, glowing data streams, obsidian and glass textures.")
            .line(format!("Composition: Cinematic {angle}, Shot Distance: {distance}, Dynamic Lighting ({lighting}), Epic Scale."))
            .line("The image should look insanely detailed and \"crazy\" creative. Ultra-sharp.")
            .build()
        }
        StylePreset::PureCreation => {
            let topic = topic_or(config, "A beautiful scene");
            Template::new(
                format!("Create a Professional, High-Quality, Photorealistic image based on the description: \"{topic}\"."),
                config,
            )
            .line("Style: Cinematic Photography, Commercial Quality, Highly Detailed, Natural Textures.")
            .line(format!("Lighting: {lighting}."))
            .line(format!("Angle: {angle}."))
            .line(format!("Distance: {distance}."))
            .line("Composition: Balanced, professional, aesthetically pleasing.")
            .line("Quality: 8k, Sharp Focus, Masterpiece.")
            .build()
        }
        StylePreset::FreeEdit => {
            let topic = topic_or(config, "Enhance the image");
            Template::new("Task: Creative Image Editing / Manipulation.", config)
                .line(format!("User Instruction: \"{topic}\"."))
                .line("Guidelines:")
                .line("- Modify the image according to the user's instruction precisely.")
                .line("- You have creative freedom to change the subject, background, or atmosphere if the prompt implies it.")
                .line(format!("- Lighting preference: {lighting}."))
                .line("- Maintain high quality, 8k resolution.")
                .build()
        }
        StylePreset::Files3dRender => Template::new(
            "Transform the UI Screenshot of files into a High-End 3D Isometric Illustration.",
            config,
        )
        .line("Subject: The Folders and Files visible in the image.")
        .line("Action: Convert the flat 2D icons into premium 3D Objects.")
        .line("CRITICAL PRIORITY: TEXT CLARITY.")
        .line("- The filenames (e.g., style.css, index.html) visible in the source image MUST be preserved and rendered as SHARP, HIGH-CONTRAST 3D TYPOGRAPHY.")
        .line("- Ensure the text is large enough to be readable.")
        .line("- Do not blur the text.")
        .line("Details:")
        .line("- Folders: Render as puffy, matte yellow 3D folders (Claymorphism style).")
        .line("- Files: Render as floating glossy sheets or 3D cards.")
        .line("- Composition: Floating dynamically above a frosted glass platform.")
        .line("- Elements: Add small floating 3D primitive shapes (cubes, spheres) around them for elegance.")
        .line("- Lighting: Soft, warm studio lighting with rim lights.")
        .line("- Background: Dark grey or clean dark studio environment.")
        .line("Style: Blender 3D Render, Cute, Elegant, Clean, High Quality.")
        .build(),
        StylePreset::CodingHologram => Template::new("Professional Futuristic Product Photography.", config)
            .line("Subject: The Laptop/Computer screen.")
            .line("Effect: VISUALIZATION OF CODE AS HOLOGRAPHIC ART.")
            .line("Details:")
            .line("- The code/text on the screen transforms into glowing, 3D holographic data streams that flow OUT of the physical screen into the air.")
            .line("- Treat the code as a \"Visual Texture\" rather than readable text.")
            .line("- The data flow wraps elegantly around the device like a magical tech aura.")
            .line("- Colors: Electric Blue, Neon Purple, and Cyber Cyan (Matrix style but modern and elegant).")
            .line("- Lighting: Volumetric lighting rays emanating from the display.")
            .line("- The laptop hardware remains sharp, realistic, and premium.")
            .line("Background: Dark, sleek, high-tech abstract environment (Depth of field).")
            .line("Vibe: Advertising for advanced AI or Quantum Computing.")
            .line("Quality: 8k, Unreal Engine Render style, Particle Effects.")
            .build(),
        StylePreset::DeveloperPro => Template::new(
            "Professional Cinematic Portrait of a Senior Software Engineer / Hacker.",
            config,
        )
        .line("Setting: High-Tech futuristic workspace command center.")
        .line("Details:")
        .line("- Surrounded by multiple curved monitors displaying complex neon blue and purple code (Python/React/C++).")
        .line("- Floating holographic data interfaces in the air.")
        .line("- Cyberpunk city skyline visible through large glass windows in the back.")
        .line("- Lighting: Dramatic mix of deep purple (Venom) and electric blue neon rim lighting.")
        .line("- Atmosphere: Serious, professional, tech-savvy, futuristic, high-end production value.")
        .line("- Quality: 8k, Unreal Engine 5 render style, raytracing, sharp focus on the person.")
        .line(format!("- POSE: {pose} (Ensure the subject follows this pose in a natural, professional way)."))
        .line(format!("- DISTANCE: {distance}."))
        .line(format!("- EYE GAZE / FACE DIRECTION: {face_direction}."))
        .build(),
        StylePreset::SmartphonePhoto => Template::new(
            "Professional High-End Tech Product Photography for Smartphone.",
            config,
        )
        .line("Subject: The Smartphone (Display and Body).")
        .line("Style: Apple/Samsung Official Advertisement Style. Sleek, Minimalist, Premium.")
        .line("Details:")
        .line("- Accentuate the screen vibrancy and bezel-less design.")
        .line("- Highlight the camera module lens reflections (Glass texture).")
        .line("- Body Material: Brushed Metal or Polished Glass.")
        .line(format!("Lighting: {lighting} (Softbox or Rim lighting to highlight edges)."))
        .line("Background: Abstract Tech, Smooth Gradient, or Floating Geometry.")
        .line("Quality: 8k, Ultra-Sharp Macro details.")
        .build(),
        StylePreset::TechAccessories => Template::new(
            "Professional Commercial Product Photography for Tech Accessories.",
            config,
        )
        .line("Subject: Gadget/Accessory (Headphones, Smartwatch, Case, or Charger).")
        .line("Style: Premium Tech Editorial (The Verge / MKBHD style).")
        .line("Details:")
        .line("- Focus on premium materials: Matte Silicone, Brushed Aluminum, Leather texture, Mesh fabric.")
        .line("- Highlight LEDs or Screen displays if applicable.")
        .line("- Clean, modern, minimalist studio setting.")
        .line(format!("Lighting: {lighting} (Soft, controlled studio lighting to show form)."))
        .line("Background: Monochrome matte surface or architectural concrete.")
        .line("Quality: 8k, Macro focus on textures.")
        .build(),
        StylePreset::FoodPhotography => Template::new("Professional Commercial Food Photography.", config)
            .line("Subject: The food item (Sweet, Biscuit, Dish, or Drink).")
            .line("Style: High-end culinary magazine style (Bon Appétit).")
            .line("Details: Focus on appetizing textures, crumbs, glaze, steam, freshness.")
            .line("Lighting: Soft, diffused natural window lighting or professional studio food lighting to enhance appetite appeal.")
            .line("Background: Complementary culinary setting (marble counter, wooden table, cafe, bakery).")
            .line(format!("Composition: {angle}, {distance}, {aspect_ratio}."))
            .line("Vibe: Delicious, Fresh, Premium.")
            .line("Quality: 8k, Macro focus.")
            .build(),
        StylePreset::ShoesElegance => {
            let composition = match angle {
                CameraAngle::EyeLevel => "Floating dynamically".to_string(),
                other => other.to_string(),
            };
            Template::new("Professional Commercial Sneaker/Shoe Photography.", config)
                .line("Style: Hypebeast Streetwear or Luxury Editorial.")
                .line("Details: Ultra-sharp focus on fabric/leather texture, stitching, and logos.")
                .line(format!("Composition: {composition}."))
                .line(format!("Distance: {distance}."))
                .line(format!("Lighting: {lighting} (Emphasis on rim lighting to show silhouette)."))
                .line("Background: Concrete, Abstract Geometric, or Studio.")
                .line("Quality: 8k, Ultra-Sharp.")
                .build()
        }
        StylePreset::FashionClothing => Template::new("High Fashion Editorial Photography.", config)
            .line("Style: Vogue/Harper's Bazaar Aesthetic.")
            .line("Details: Focus on fabric drape, texture, and fit.")
            .line(format!("Subject Pose: {pose}."))
            .line(format!("Distance: {distance}."))
            .line(format!("Lighting: {lighting} (Fashion Studio Lighting)."))
            .line("Background: Minimalist luxury or urban chic.")
            .line("Quality: 8k, Texture rich.")
            .build(),
        // Only reachable if the catalog marks another style as templated
        // without a template here.
        other => {
            tracing::warn!(style = %other, "no template for style, using fallback prompt");
            fallback_prompt(config)
        }
    }
}

fn optimizer_instruction(config: &GenerationConfig, has_reference: bool) -> String {
    let base_prompt = match config.prompt.trim() {
        "" => "A professional product shot.".to_string(),
        text => format!("User description: \"{text}\""),
    };
    let style_details = config.style.prompt_suffix();
    let reference_note = if has_reference {
        "Match the style/vibe of the provided reference image."
    } else {
        ""
    };
    let background = config
        .background_color
        .as_deref()
        .map(|color| format!("BACKGROUND MUST BE SOLID COLOR: {color}."))
        .unwrap_or_default();
    let constraints = constraint_clause(config).unwrap_or_default();

    format!(
        r#"You are an Expert Product Photography Prompt Engineer.
Your goal is to convert user requests (which may contain non-English option labels) into a precise, high-quality ENGLISH prompt for an Image Generation Model.

The User has provided specific configurations:
1. Angle: "{angle}" (Translate this to English camera terminology).
2. Distance: "{distance}" (Translate to English camera shot type).
3. Lighting: "{lighting}" (Translate to English lighting setup).
4. Subject Pose: "{pose}" (Translate this. If it implies action, describe it).
5. Face Direction: "{face}" (Where the subject is looking).
6. Aspect Ratio: "{aspect_ratio}".
7. Background Color: "{background}".
8. Style Context: "{style_details}".
9. User Custom Description: "{base_prompt}".
10. MANDATORY CONSTRAINTS: "{constraints}".
11. Reference Image: "{reference_note}".

OUTPUT FORMAT:
"[Camera Angle], [Camera Distance/Shot Type], [Subject Pose Description], [Face Direction], [Lighting Setup], [Background Description], [Style Keywords/Texture/Vibe], [Mandatory Constraints], 8k Ultra Resolution, Masterpiece"

Constraint: Refer to the subject as "the central subject".
Ensure the prompt is descriptive and artistic."#,
        angle = config.angle,
        distance = config.distance,
        lighting = config.lighting,
        pose = config.pose,
        face = config.face_direction,
        aspect_ratio = config.aspect_ratio,
    )
}
