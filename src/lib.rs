#![warn(missing_docs)]
//! Shotcraft - photography-style prompt composition and scene generation.
//!
//! This crate turns a set of photography options (style preset, camera angle,
//! lighting, pose, ...) into a prompt, sends it with the user's source images
//! to an image model, and returns the generated scene. It can also ask a vision
//! model to describe an existing image.
//!
//! # Quick Start - Scenes
//!
//! ```no_run
//! use shotcraft::{GenerationConfig, ImageAsset, Studio, StudioRequest, StylePreset};
//!
//! #[tokio::main]
//! async fn main() -> shotcraft::Result<()> {
//!     let studio = Studio::gemini()?;
//!     let request = StudioRequest::new(
//!         GenerationConfig::new(StylePreset::Luxury).with_prompt("on black marble"),
//!     )
//!     .with_image(ImageAsset::from_path("watch.jpg")?);
//!
//!     let generation = studio.run(&request).await?;
//!     if let Some(image) = generation.image() {
//!         image.save("watch-luxury.png")?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Quick Start - Analysis
//!
//! ```no_run
//! use shotcraft::{ImageAsset, Studio};
//!
//! #[tokio::main]
//! async fn main() -> shotcraft::Result<()> {
//!     let studio = Studio::gemini()?;
//!     let result = studio.analyze(&[ImageAsset::from_path("photo.jpg")?]).await?;
//!     println!("{}", result.creation_prompt);
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `gemini` (default): Gemini backend over the Generative Language API
//! - `cli`: Command-line interface

pub mod analyzer;
pub mod catalog;
pub mod composer;
mod error;
pub mod generator;
pub mod model;
pub mod options;
pub mod studio;
pub mod types;

pub use error::{Result, StudioError, GENERIC_USER_MESSAGE};

pub use analyzer::ImageAnalyzer;
pub use catalog::{PromptTreatment, SceneTask, StyleDefinition, StylePreset};
pub use composer::PromptComposer;
pub use generator::SceneGenerator;
pub use model::{ContentPart, ImageRequest, ModelBackend, TextRequest};
pub use options::{
    AspectRatio, CameraAngle, CameraDistance, FaceDirection, LightingPreset, Resolution,
    SocialPlatform, SubjectPose,
};
pub use studio::{Generation, ProcessingStep, Studio, StudioRequest, StudioStatus};
pub use types::{GenerationConfig, ImageAnalysisResult, ImageAsset, ImageFormat, SceneRequest};

#[cfg(feature = "gemini")]
pub use model::{GeminiBackend, GeminiBackendBuilder, GeminiImageModel, GeminiTextModel};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{Result, StudioError};
    pub use crate::model::ModelBackend;
    pub use crate::options::{
        AspectRatio, CameraAngle, CameraDistance, FaceDirection, LightingPreset, Resolution,
        SubjectPose,
    };
    pub use crate::studio::{Generation, Studio, StudioRequest, StudioStatus};
    pub use crate::types::{GenerationConfig, ImageAnalysisResult, ImageAsset};
    pub use crate::StylePreset;

    #[cfg(feature = "gemini")]
    pub use crate::model::GeminiBackend;
}
