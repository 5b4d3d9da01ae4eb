//! Remote model backends.

mod backend;
#[cfg(feature = "gemini")]
mod gemini;
#[cfg(test)]
pub(crate) mod mock;

pub use backend::{ContentPart, ImageRequest, ModelBackend, TextRequest};

#[cfg(feature = "gemini")]
pub use gemini::{
    GeminiBackend, GeminiBackendBuilder, GeminiImageModel, GeminiTextModel, DEFAULT_BASE_URL,
};
