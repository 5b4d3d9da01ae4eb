//! Style preset catalog.
//!
//! Every preset maps to static display metadata, a default prompt fragment,
//! and two capability flags: how its prompt is built ([`PromptTreatment`]) and
//! which task the scene generator runs for it ([`SceneTask`]). Both the
//! composer and the generator read these flags instead of matching on styles
//! themselves.

use crate::error::{Result, StudioError};
use serde::{Deserialize, Serialize};

/// Literal prompt for background removal.
pub const REMOVE_BACKGROUND_PROMPT: &str =
    "Solid white background #FFFFFF. Isolate the object. No shadows. Clean cutout.";

/// Literal prompt for upscaling.
pub const UPSCALE_PROMPT: &str =
    "Upscale and enhance to 8k ultra resolution. Remove noise. sharpen details.";

/// How the composer turns a configuration into a prompt for a style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTreatment {
    /// A literal instruction, independent of every other parameter.
    Fixed(&'static str),
    /// Pure text-to-image from the user's description.
    Creative,
    /// A hand-written template for a specialized domain.
    Template,
    /// Sent to the remote text model for translation and optimization.
    Optimized,
}

impl PromptTreatment {
    /// Returns true if composing for this treatment calls the remote model.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Optimized)
    }
}

/// The task description the scene generator sends with the images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneTask {
    /// Upscale and enhance, keeping everything else.
    Upscale,
    /// Extract the product onto pure white.
    RemoveBackground,
    /// Generate from text alone; source images are optional.
    TextToImage,
    /// Convert a file/folder screenshot into a 3D render.
    FileIcons3d,
    /// Free-form editing with creative latitude.
    FreeEdit,
    /// Keep the subject, replace the scene around it.
    SubjectPreserving,
}

impl SceneTask {
    /// Returns true if a reference image is meaningful for this task.
    pub fn accepts_reference(&self) -> bool {
        !matches!(self, Self::RemoveBackground)
    }

    /// Returns true if the task needs at least one source image.
    pub fn requires_source(&self) -> bool {
        !matches!(self, Self::TextToImage)
    }
}

/// Static metadata for one style preset.
#[derive(Debug, Clone, Copy)]
pub struct StyleDefinition {
    /// Display label.
    pub label: &'static str,
    /// Icon glyph.
    pub icon: &'static str,
    /// Default prompt fragment describing the look.
    pub prompt_suffix: &'static str,
    /// How prompts are composed.
    pub treatment: PromptTreatment,
    /// What the generator asks the image model to do.
    pub task: SceneTask,
}

/// Photographic or artistic treatment selected by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StylePreset {
    /// Free-form creative edit.
    FreeEdit,
    /// Portrait of a software developer in a futuristic workspace.
    DeveloperPro,
    /// Laptop with code flowing out as holograms.
    CodingHologram,
    /// File/folder screenshot rendered as 3D icons.
    #[serde(rename = "files-3d-render")]
    Files3dRender,
    /// Smartphone product shot.
    SmartphonePhoto,
    /// Headphones, watches, cases and chargers.
    TechAccessories,
    /// Let the model pick a background suited to the product.
    #[default]
    SmartAd,
    /// Fantastical text-to-image.
    Imagine,
    /// Realistic text-to-image.
    PureCreation,
    /// Sneakers and shoes.
    ShoesElegance,
    /// Fashion and clothing.
    FashionClothing,
    /// Food and drink.
    FoodPhotography,
    /// Pure white cutout.
    RemoveBg,
    /// Studio portrait with soft light.
    Portrait,
    /// Retro look with film grain.
    Vintage,
    /// Hyper-realistic detail.
    HyperReal,
    /// Clean minimalist composition.
    Minimalist,
    /// Bright, scroll-stopping social post.
    SocialMedia,
    /// Stylized 3D render.
    ThreeD,
    /// Octane-style render.
    Octane,
    /// Outdoor natural setting.
    Nature,
    /// Luxury product shot.
    Luxury,
    /// Fantastical advertising scene.
    AdFantasy,
    /// Upscale only.
    Upscale,
}

impl StylePreset {
    /// Every preset, in display order.
    pub const ALL: &'static [Self] = &[
        Self::FreeEdit,
        Self::DeveloperPro,
        Self::CodingHologram,
        Self::Files3dRender,
        Self::SmartphonePhoto,
        Self::TechAccessories,
        Self::SmartAd,
        Self::Imagine,
        Self::PureCreation,
        Self::ShoesElegance,
        Self::FashionClothing,
        Self::FoodPhotography,
        Self::RemoveBg,
        Self::Portrait,
        Self::Vintage,
        Self::HyperReal,
        Self::Minimalist,
        Self::SocialMedia,
        Self::ThreeD,
        Self::Octane,
        Self::Nature,
        Self::Luxury,
        Self::AdFantasy,
        Self::Upscale,
    ];

    /// Returns the stable identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FreeEdit => "free-edit",
            Self::DeveloperPro => "developer-pro",
            Self::CodingHologram => "coding-hologram",
            Self::Files3dRender => "files-3d-render",
            Self::SmartphonePhoto => "smartphone-photo",
            Self::TechAccessories => "tech-accessories",
            Self::SmartAd => "smart-ad",
            Self::Imagine => "imagine",
            Self::PureCreation => "pure-creation",
            Self::ShoesElegance => "shoes-elegance",
            Self::FashionClothing => "fashion-clothing",
            Self::FoodPhotography => "food-photography",
            Self::RemoveBg => "remove-bg",
            Self::Portrait => "portrait",
            Self::Vintage => "vintage",
            Self::HyperReal => "hyper-real",
            Self::Minimalist => "minimalist",
            Self::SocialMedia => "social-media",
            Self::ThreeD => "three-d",
            Self::Octane => "octane",
            Self::Nature => "nature",
            Self::Luxury => "luxury",
            Self::AdFantasy => "ad-fantasy",
            Self::Upscale => "upscale",
        }
    }

    /// Returns the catalog entry for this preset.
    pub fn definition(&self) -> StyleDefinition {
        use PromptTreatment::{Creative, Fixed, Optimized, Template};
        use SceneTask::*;

        let (label, icon, prompt_suffix, treatment, task) = match self {
            Self::FreeEdit => (
                "تعديل حر (Magic Edit)",
                "🪄",
                "Creative Image Editing based on user prompt. Freedom to modify subject and environment.",
                Template,
                FreeEdit,
            ),
            Self::Files3dRender => (
                "تجسيم ملفات 3D",
                "📂✨",
                "3D Isometric Render of Files and Folders, Claymorphism, Blender Style, Floating Elements, Frosted Glass, Cute 3D Icons.",
                Template,
                FileIcons3d,
            ),
            Self::CodingHologram => (
                "سحر الأكواد (هولوغرام)",
                "💻✨",
                "Futuristic Laptop Photography, Holographic Code Flow, Glowing Data Streams, 3D Floating Syntax, Volumetric Lighting, High-End Tech Ad.",
                Template,
                SubjectPreserving,
            ),
            Self::Imagine => (
                "تخيل جنوني (من الصفر)",
                "🌌",
                "Pure Text-to-Image Generation. Create a mind-bending, futuristic, high-tech masterpiece.",
                Creative,
                TextToImage,
            ),
            Self::PureCreation => (
                "تخيل مشهد (واقعي/حر)",
                "🎨",
                "Pure Text-to-Image. Photorealistic, High-End Production, Cinematic Composition, Natural Details.",
                Creative,
                TextToImage,
            ),
            Self::SmartphonePhoto => (
                "تصوير هواتف (Tech)",
                "📱",
                "High-End Tech Product Photography, Sleek Smartphone Presentation, Screen Reflection, Glossy Finish, Futuristic Lighting, Clean Surface.",
                Template,
                SubjectPreserving,
            ),
            Self::TechAccessories => (
                "اكسسوارات تقنية",
                "🎧",
                "Professional Tech Accessories Photography. Headphones, Watches, Cases. Focus on Materials (Silicone, Mesh, Leather, Metal). Clean Studio Lighting.",
                Template,
                SubjectPreserving,
            ),
            Self::ShoesElegance => (
                "أحذية فاخرة (Sneakers)",
                "👟",
                "Professional Shoe Photography, Hypebeast Style, Dynamic Floating or Concrete Surface, Sharp Focus on Texture/Fabric, Commercial Lighting.",
                Template,
                SubjectPreserving,
            ),
            Self::FashionClothing => (
                "أزياء وملابس (Fashion)",
                "👗",
                "High Fashion Editorial, Vogue Style, Focus on Fabric Drape and Texture, Professional Model or Mannequin, Neutral Luxury Background.",
                Template,
                SubjectPreserving,
            ),
            Self::FoodPhotography => (
                "تصوير أطعمة (Food)",
                "🍩",
                "Professional Food Photography, Culinary Magazine Style, Macro Details, Appetizing, Freshness, Crumbs, Steam.",
                Template,
                SubjectPreserving,
            ),
            Self::DeveloperPro => (
                "محترف برمجيات (شخصي)",
                "👨‍💻",
                "Masterpiece portrait of a software engineer, futuristic setup, holographic screens, matrix code, cyber atmosphere.",
                Template,
                SubjectPreserving,
            ),
            Self::SmartAd => (
                "إعلان ذكي (منتجات)",
                "🧠",
                "Analyze the product category. Generate a suitable commercial background.",
                Optimized,
                SubjectPreserving,
            ),
            Self::RemoveBg => (
                "تفريغ الخلفية",
                "✂️",
                "Solid white background #FFFFFF. Product isolation. No shadows, no props. Pure clean studio cutout style.",
                Fixed(REMOVE_BACKGROUND_PROMPT),
                RemoveBackground,
            ),
            Self::Upscale => (
                "رفع الدقة فقط",
                "⚡",
                "high fidelity, 4k upscaling, sharpen details, denoise, preserve original background",
                Fixed(UPSCALE_PROMPT),
                Upscale,
            ),
            Self::AdFantasy => (
                "إعلان خيالي",
                "✨",
                "surreal advertising masterpiece, defying gravity, magical atmosphere, electric energy",
                Optimized,
                SubjectPreserving,
            ),
            Self::Portrait => (
                "بورتريه",
                "👤",
                "portrait photography, bokeh background, focus on product",
                Optimized,
                SubjectPreserving,
            ),
            Self::Vintage => (
                "كلاسيكي",
                "📻",
                "vintage aesthetic, retro styling, warm film grain",
                Optimized,
                SubjectPreserving,
            ),
            Self::HyperReal => (
                "واقعي جداً",
                "👁️",
                "hyper-realistic, 8k resolution, sharp focus",
                Optimized,
                SubjectPreserving,
            ),
            Self::Minimalist => (
                "بسيط",
                "⬜",
                "minimalist design, clean solid background, modern",
                Optimized,
                SubjectPreserving,
            ),
            Self::SocialMedia => (
                "سوشيال ميديا",
                "📱",
                "instagram aesthetic, bright colors, lifestyle setting",
                Optimized,
                SubjectPreserving,
            ),
            Self::ThreeD => (
                "ثلاثي الأبعاد",
                "🧊",
                "3D render style, perfect geometry, soft shadows",
                Optimized,
                SubjectPreserving,
            ),
            Self::Octane => (
                "سينمائي",
                "🎬",
                "cinematic lighting, octane render, dramatic atmosphere",
                Optimized,
                SubjectPreserving,
            ),
            Self::Nature => (
                "طبيعة",
                "🌿",
                "surrounded by nature, organic elements, sunlight",
                Optimized,
                SubjectPreserving,
            ),
            Self::Luxury => (
                "فاخر",
                "💎",
                "luxury setting, black marble, gold accents, premium",
                Optimized,
                SubjectPreserving,
            ),
        };

        StyleDefinition {
            label,
            icon,
            prompt_suffix,
            treatment,
            task,
        }
    }

    /// Shorthand for `definition().label`.
    pub fn label(&self) -> &'static str {
        self.definition().label
    }

    /// Shorthand for `definition().prompt_suffix`.
    pub fn prompt_suffix(&self) -> &'static str {
        self.definition().prompt_suffix
    }

    /// Shorthand for `definition().treatment`.
    pub fn treatment(&self) -> PromptTreatment {
        self.definition().treatment
    }

    /// Shorthand for `definition().task`.
    pub fn task(&self) -> SceneTask {
        self.definition().task
    }

    /// Returns true for the pure text-to-image presets.
    pub fn is_text_to_image(&self) -> bool {
        self.task() == SceneTask::TextToImage
    }
}

impl std::fmt::Display for StylePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StylePreset {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|style| style.as_str().eq_ignore_ascii_case(&needle))
            .ok_or_else(|| StudioError::InvalidRequest(format!("unknown style '{s}'")))
    }
}
