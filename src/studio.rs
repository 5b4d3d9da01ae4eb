//! The end-to-end pipeline: compose a prompt, then generate the scene.
//!
//! Every [`Studio::run`] call takes a request token from a monotonically
//! increasing counter. A run whose token is no longer the latest when it
//! finishes is reported as [`Generation::Superseded`] and leaves the published
//! [`StudioStatus`] alone, so the newest request always wins regardless of the
//! order in which responses arrive.

use crate::analyzer::ImageAnalyzer;
use crate::catalog::StylePreset;
use crate::composer::PromptComposer;
use crate::error::{Result, StudioError};
use crate::generator::SceneGenerator;
use crate::model::ModelBackend;
use crate::types::{GenerationConfig, ImageAnalysisResult, ImageAsset, SceneRequest};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Step shown while a request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStep {
    /// Composing a text-to-image prompt.
    Conceptualizing,
    /// Composing a prompt for an edit of the source images.
    AnalyzingComposition,
    /// Generating an upscale.
    Upscaling,
    /// Generating a text-to-image scene.
    RenderingScene,
    /// Generating any other scene.
    GeneratingMasterpiece,
}

impl ProcessingStep {
    /// Returns the progress message for this step.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Conceptualizing => "Conceptualizing...",
            Self::AnalyzingComposition => "Analyzing Composition...",
            Self::Upscaling => "Upscaling & Refining (8K)...",
            Self::RenderingScene => "Rendering Scene...",
            Self::GeneratingMasterpiece => "Generating Masterpiece...",
        }
    }

    fn composing(style: StylePreset) -> Self {
        if style.is_text_to_image() {
            Self::Conceptualizing
        } else {
            Self::AnalyzingComposition
        }
    }

    fn rendering(style: StylePreset) -> Self {
        if style == StylePreset::Upscale {
            Self::Upscaling
        } else if style.is_text_to_image() {
            Self::RenderingScene
        } else {
            Self::GeneratingMasterpiece
        }
    }
}

impl std::fmt::Display for ProcessingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Observable state of the studio, always describing the latest request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudioStatus {
    /// Nothing in flight and nothing to show.
    Idle,
    /// A request is in flight.
    Processing {
        /// Request token.
        token: u64,
        /// Current step.
        step: ProcessingStep,
    },
    /// The latest request produced an image.
    Succeeded {
        /// Request token.
        token: u64,
        /// Generated image.
        image: ImageAsset,
    },
    /// The latest request failed.
    Failed {
        /// Request token.
        token: u64,
        /// Message safe to show users.
        message: String,
    },
}

impl StudioStatus {
    /// Returns true while a request is in flight.
    pub fn is_processing(&self) -> bool {
        matches!(self, Self::Processing { .. })
    }
}

/// Outcome of one [`Studio::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// This request is the latest and produced an image.
    Completed {
        /// Request token.
        token: u64,
        /// Prompt sent to the image model.
        prompt: String,
        /// Generated image.
        image: ImageAsset,
    },
    /// A newer request was issued before this one finished; its result was discarded.
    Superseded {
        /// Request token.
        token: u64,
    },
}

impl Generation {
    /// Returns the image if the request completed.
    pub fn image(&self) -> Option<&ImageAsset> {
        match self {
            Self::Completed { image, .. } => Some(image),
            Self::Superseded { .. } => None,
        }
    }

    /// Returns the request token.
    pub fn token(&self) -> u64 {
        match self {
            Self::Completed { token, .. } | Self::Superseded { token } => *token,
        }
    }
}

/// Images and settings for one user action.
#[derive(Debug, Clone, Default)]
pub struct StudioRequest {
    /// Selected options.
    pub config: GenerationConfig,
    /// Source images.
    pub images: Vec<ImageAsset>,
    /// Optional style reference.
    pub reference: Option<ImageAsset>,
}

impl StudioRequest {
    /// Creates a request with no images.
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            images: Vec::new(),
            reference: None,
        }
    }

    /// Adds a source image.
    pub fn with_image(mut self, image: ImageAsset) -> Self {
        self.images.push(image);
        self
    }

    /// Replaces the source images.
    pub fn with_images(mut self, images: Vec<ImageAsset>) -> Self {
        self.images = images;
        self
    }

    /// Sets the reference image.
    pub fn with_reference(mut self, reference: ImageAsset) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Rejects requests that cannot succeed, before any network call.
    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;
        if self.images.is_empty() && self.config.style.task().requires_source() {
            return Err(StudioError::InvalidRequest(format!(
                "style '{}' needs at least one source image",
                self.config.style
            )));
        }
        Ok(())
    }
}

/// Composer, generator and analyzer over one shared backend.
pub struct Studio {
    composer: PromptComposer,
    generator: SceneGenerator,
    analyzer: ImageAnalyzer,
    latest: AtomicU64,
    status: watch::Sender<StudioStatus>,
}

impl Studio {
    /// Creates a studio over the given backend.
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        let (status, _) = watch::channel(StudioStatus::Idle);
        Self {
            composer: PromptComposer::new(backend.clone()),
            generator: SceneGenerator::new(backend.clone()),
            analyzer: ImageAnalyzer::new(backend),
            latest: AtomicU64::new(0),
            status,
        }
    }

    /// Creates a studio over a [`GeminiBackend`](crate::GeminiBackend) configured from the environment.
    #[cfg(feature = "gemini")]
    pub fn gemini() -> Result<Self> {
        let backend = crate::model::GeminiBackend::builder().build()?;
        Ok(Self::new(Arc::new(backend)))
    }

    /// Returns the prompt composer.
    pub fn composer(&self) -> &PromptComposer {
        &self.composer
    }

    /// Returns the scene generator.
    pub fn generator(&self) -> &SceneGenerator {
        &self.generator
    }

    /// Subscribes to status changes.
    pub fn subscribe(&self) -> watch::Receiver<StudioStatus> {
        self.status.subscribe()
    }

    /// Returns the current status.
    pub fn status(&self) -> StudioStatus {
        self.status.borrow().clone()
    }

    /// Returns a finished status to [`StudioStatus::Idle`].
    pub fn dismiss(&self) {
        self.status.send_if_modified(|status| {
            if matches!(status, StudioStatus::Succeeded { .. } | StudioStatus::Failed { .. }) {
                *status = StudioStatus::Idle;
                true
            } else {
                false
            }
        });
    }

    /// Runs composer then generator for one request.
    ///
    /// A request that fails validation is rejected without taking a token, so
    /// it neither supersedes the request in flight nor changes the status.
    pub async fn run(&self, request: &StudioRequest) -> Result<Generation> {
        request.validate()?;

        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let config = &request.config;

        self.publish(token, StudioStatus::Processing {
            token,
            step: ProcessingStep::composing(config.style),
        });

        let prompt = self
            .composer
            .compose(config, request.reference.is_some())
            .await;

        tracing::debug!(token, style = %config.style, prompt_len = prompt.len(), "prompt composed");

        // Nothing left to publish for a superseded request; skip the image call.
        if !self.publish(token, StudioStatus::Processing {
            token,
            step: ProcessingStep::rendering(config.style),
        }) {
            tracing::debug!(token, "request superseded before generation");
            return Ok(Generation::Superseded { token });
        }

        let scene = SceneRequest::from_config(config, prompt.clone())
            .with_images(request.images.clone())
            .with_reference(request.reference.clone());

        match self.generator.generate(&scene).await {
            Ok(image) => {
                let published = self.publish(token, StudioStatus::Succeeded {
                    token,
                    image: image.clone(),
                });
                if !published {
                    tracing::debug!(token, "discarding superseded result");
                    return Ok(Generation::Superseded { token });
                }
                Ok(Generation::Completed {
                    token,
                    prompt,
                    image,
                })
            }
            Err(e) => {
                let published = self.publish(token, StudioStatus::Failed {
                    token,
                    message: e.user_message(),
                });
                if !published {
                    tracing::debug!(token, "discarding superseded failure: {e}");
                    return Ok(Generation::Superseded { token });
                }
                Err(e)
            }
        }
    }

    /// Analyzes the first of `images`.
    pub async fn analyze(&self, images: &[ImageAsset]) -> Result<ImageAnalysisResult> {
        self.analyzer.analyze(images).await
    }

    /// Publishes `status` if `token` is still the latest request.
    fn publish(&self, token: u64, status: StudioStatus) -> bool {
        self.status.send_if_modified(|current| {
            if self.latest.load(Ordering::SeqCst) != token {
                return false;
            }
            *current = status;
            true
        })
    }
}
