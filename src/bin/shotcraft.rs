//! CLI for Shotcraft - photography-style scene generation.

use clap::{Args, Parser, Subcommand, ValueEnum};
use shotcraft::{
    AspectRatio, CameraAngle, CameraDistance, FaceDirection, GeminiBackend, GeminiImageModel,
    GeminiTextModel, Generation, GenerationConfig, ImageAsset, LightingPreset, PromptTreatment,
    Resolution, SocialPlatform, Studio, StudioRequest, StylePreset, SubjectPose,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shotcraft")]
#[command(about = "Compose photography prompts and generate scenes with Gemini image models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a scene from source images (or from text for text-to-image styles)
    Generate(GenerateArgs),

    /// Print the prompt a style would use, without generating an image
    Compose(ComposeArgs),

    /// Describe an image as a creation prompt and a preservation prompt
    Analyze(AnalyzeArgs),

    /// List available style presets
    Styles,
}

#[derive(Args)]
struct ConfigArgs {
    /// Style preset (see `shotcraft styles`)
    #[arg(short, long, default_value = "smart-ad")]
    style: StylePreset,

    /// Free-text description of the desired scene
    #[arg(short, long, default_value = "")]
    prompt: String,

    /// Elements that must be preserved or included
    #[arg(long, default_value = "")]
    fixed: String,

    /// Camera angle (e.g. eye-level, low-angle, top-down)
    #[arg(long, default_value = "eye-level")]
    angle: CameraAngle,

    /// Camera distance (e.g. close-up, medium, long-shot)
    #[arg(long, default_value = "medium")]
    distance: CameraDistance,

    /// Lighting preset (e.g. softbox, rim, neon)
    #[arg(long, default_value = "softbox")]
    lighting: LightingPreset,

    /// Subject pose or product placement
    #[arg(long, default_value = "auto")]
    pose: SubjectPose,

    /// Face direction
    #[arg(long, default_value = "camera")]
    face: FaceDirection,

    /// Output resolution (fhd, 2k, 4k)
    #[arg(long, default_value = "fhd")]
    resolution: Resolution,

    /// Aspect ratio (1:1, 4:5, 9:16, 16:9, 2:1)
    #[arg(long, conflicts_with = "platform")]
    aspect_ratio: Option<AspectRatio>,

    /// Pick the aspect ratio for a social platform
    #[arg(long)]
    platform: Option<SocialPlatform>,

    /// Background color as #RGB or #RRGGBB
    #[arg(long)]
    background: Option<String>,
}

impl ConfigArgs {
    fn to_config(&self) -> GenerationConfig {
        let aspect_ratio = self
            .aspect_ratio
            .or_else(|| self.platform.map(|p| p.aspect_ratio()))
            .unwrap_or_default();

        let mut config = GenerationConfig::new(self.style)
            .with_prompt(&self.prompt)
            .with_fixed_elements(&self.fixed)
            .with_angle(self.angle)
            .with_distance(self.distance)
            .with_lighting(self.lighting)
            .with_pose(self.pose)
            .with_face_direction(self.face)
            .with_resolution(self.resolution)
            .with_aspect_ratio(aspect_ratio);
        if let Some(ref color) = self.background {
            config = config.with_background_color(color);
        }
        config
    }
}

#[derive(Args)]
struct GenerateArgs {
    /// Source images
    images: Vec<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,

    /// Style reference image
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    models: ModelArgs,
}

#[derive(Args)]
struct ComposeArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Compose as if a style reference image were attached
    #[arg(long)]
    with_reference: bool,

    #[command(flatten)]
    models: ModelArgs,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Image to analyze
    image: PathBuf,

    #[command(flatten)]
    models: ModelArgs,
}

#[derive(Args)]
struct ModelArgs {
    /// Text and vision model
    #[arg(long, value_enum, default_value = "flash")]
    text_model: TextModelArg,

    /// Image model
    #[arg(long, value_enum, default_value = "nano-banana")]
    image_model: ImageModelArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TextModelArg {
    Flash,
    Pro,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ImageModelArg {
    NanoBanana,
    NanoBananaPro,
}

impl ModelArgs {
    fn studio(&self) -> anyhow::Result<Studio> {
        let text_model = match self.text_model {
            TextModelArg::Flash => GeminiTextModel::Flash,
            TextModelArg::Pro => GeminiTextModel::Pro,
        };
        let image_model = match self.image_model {
            ImageModelArg::NanoBanana => GeminiImageModel::NanoBanana,
            ImageModelArg::NanoBananaPro => GeminiImageModel::NanoBananaPro,
        };
        let backend = GeminiBackend::builder()
            .text_model(text_model)
            .image_model(image_model)
            .build()?;
        Ok(Studio::new(Arc::new(backend)))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => {
            generate(args, cli.json).await?;
        }
        Commands::Compose(args) => {
            compose(args, cli.json).await?;
        }
        Commands::Analyze(args) => {
            analyze(args, cli.json).await?;
        }
        Commands::Styles => {
            list_styles(cli.json)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn generate(args: GenerateArgs, json_output: bool) -> anyhow::Result<()> {
    let config = args.config.to_config();
    let mut request = StudioRequest::new(config);
    for path in &args.images {
        request = request.with_image(ImageAsset::from_path(path)?);
    }
    if let Some(ref path) = args.reference {
        request = request.with_reference(ImageAsset::from_path(path)?);
    }

    let studio = args.models.studio()?;
    let start = Instant::now();

    let generation = match studio.run(&request).await {
        Ok(generation) => generation,
        Err(e) if e.is_validation() => anyhow::bail!(e.user_message()),
        Err(e) => return Err(e.into()),
    };
    let Generation::Completed { prompt, image, .. } = generation else {
        anyhow::bail!("request was superseded");
    };

    let bytes = image.decode()?;
    std::fs::write(&args.output, &bytes)?;
    let duration_ms = start.elapsed().as_millis() as u64;

    if json_output {
        let result = serde_json::json!({
            "type": "image",
            "success": true,
            "output": args.output.display().to_string(),
            "size_bytes": bytes.len(),
            "style": request.config.style.as_str(),
            "prompt": prompt,
            "duration_ms": duration_ms,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Generated image: {} ({} bytes) in style {}",
            args.output.display(),
            bytes.len(),
            request.config.style
        );
        println!("Duration: {}ms", duration_ms);
    }

    Ok(())
}

async fn compose(args: ComposeArgs, json_output: bool) -> anyhow::Result<()> {
    let config = args.config.to_config();
    config.validate()?;

    // Fixed and template styles never touch the network.
    let prompt = if config.style.treatment().is_remote() {
        let studio = args.models.studio()?;
        studio.composer().compose(&config, args.with_reference).await
    } else {
        let studio = Studio::new(Arc::new(OfflineBackend));
        studio.composer().compose(&config, args.with_reference).await
    };

    if json_output {
        let result = serde_json::json!({
            "style": config.style.as_str(),
            "prompt": prompt,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{prompt}");
    }

    Ok(())
}

async fn analyze(args: AnalyzeArgs, json_output: bool) -> anyhow::Result<()> {
    let image = ImageAsset::from_path(&args.image)?;
    let studio = args.models.studio()?;
    let result = studio.analyze(&[image]).await?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Creation prompt:\n{}\n", result.creation_prompt);
        println!("Preservation prompt:\n{}", result.preservation_prompt);
    }

    Ok(())
}

fn list_styles(json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct StyleInfo {
        id: &'static str,
        label: &'static str,
        icon: &'static str,
        prompt: &'static str,
        text_to_image: bool,
    }

    let styles: Vec<StyleInfo> = StylePreset::ALL
        .iter()
        .map(|style| {
            let def = style.definition();
            StyleInfo {
                id: style.as_str(),
                label: def.label,
                icon: def.icon,
                prompt: match def.treatment {
                    PromptTreatment::Fixed(_) => "fixed",
                    PromptTreatment::Creative => "creative",
                    PromptTreatment::Template => "template",
                    PromptTreatment::Optimized => "optimized",
                },
                text_to_image: style.is_text_to_image(),
            }
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&styles)?);
    } else {
        println!("Available styles:\n");
        for s in &styles {
            let mode = if s.text_to_image { " [text]" } else { "" };
            println!("  {} {:<20} {:<10} {}{}", s.icon, s.id, s.prompt, s.label, mode);
        }
    }

    Ok(())
}

/// Backend for composing local prompts without credentials.
struct OfflineBackend;

#[async_trait::async_trait]
impl shotcraft::ModelBackend for OfflineBackend {
    async fn generate_text(&self, _request: &shotcraft::TextRequest) -> shotcraft::Result<String> {
        Err(shotcraft::StudioError::InvalidRequest(
            "offline backend cannot reach a model".into(),
        ))
    }

    async fn generate_image(
        &self,
        _request: &shotcraft::ImageRequest,
    ) -> shotcraft::Result<Vec<shotcraft::ContentPart>> {
        Err(shotcraft::StudioError::InvalidRequest(
            "offline backend cannot reach a model".into(),
        ))
    }

    fn name(&self) -> &str {
        "offline"
    }
}
