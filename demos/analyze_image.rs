//! Image analysis example - prints prompts describing an existing image.
//!
//! Run with: `cargo run --example analyze_image -- <photo.jpg>`
//!
//! Requires `GOOGLE_API_KEY` environment variable.

use shotcraft::{ImageAsset, Studio};

#[tokio::main]
async fn main() -> shotcraft::Result<()> {
    let input_path = std::env::args()
        .nth(1)
        .expect("Usage: analyze_image <photo.jpg>");

    let studio = Studio::gemini()?;
    let result = studio.analyze(&[ImageAsset::from_path(&input_path)?]).await?;

    println!("Creation prompt:\n{}\n", result.creation_prompt);
    println!("Preservation prompt:\n{}", result.preservation_prompt);

    Ok(())
}
