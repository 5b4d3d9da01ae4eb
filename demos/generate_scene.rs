//! Scene generation example - places a product photo in a new scene.
//!
//! Run with: `cargo run --example generate_scene -- <product.jpg> [reference.jpg]`
//!
//! Requires `GOOGLE_API_KEY` environment variable.

use shotcraft::{
    CameraAngle, GenerationConfig, ImageAsset, LightingPreset, Studio, StudioRequest, StylePreset,
};

#[tokio::main]
async fn main() -> shotcraft::Result<()> {
    let mut args = std::env::args().skip(1);
    let input_path = args
        .next()
        .expect("Usage: generate_scene <product.jpg> [reference.jpg]");

    let config = GenerationConfig::new(StylePreset::Luxury)
        .with_prompt("on a slab of black marble with soft reflections")
        .with_angle(CameraAngle::LowAngle)
        .with_lighting(LightingPreset::Dramatic);

    let mut request = StudioRequest::new(config).with_image(ImageAsset::from_path(&input_path)?);
    if let Some(reference) = args.next() {
        request = request.with_reference(ImageAsset::from_path(reference)?);
    }

    let studio = Studio::gemini()?;
    let generation = studio.run(&request).await?;

    if let Some(image) = generation.image() {
        image.save("scene.png")?;
        println!("Scene saved to scene.png");
    }

    Ok(())
}
