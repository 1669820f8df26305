//! Text-to-image generation with provider-specific settings.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use typed_builder::TypedBuilder;

use super::WorkflowReport;
use crate::{
    client::ModelClient,
    config::default_output_dir,
    error::DialError,
    file::BucketConnector,
    images,
    models::{CustomFields, ImageQuality, ImageSize, ImageStyle, Message},
};

/// OpenAI image generation deployment
pub const DALL_E_DEPLOYMENT: &str = "dall-e-3";
/// Google image generation deployment
pub const GOOGLE_IMAGE_DEPLOYMENT: &str = "imagegeneration@005";

const BASIC_PROMPT: &str = "Sunny day on Bali";
const CONFIGURED_PROMPT: &str = "A breathtaking sunset over rice terraces in Bali, with \
    traditional temples in the background, golden hour lighting, ultra-detailed, \
    cinematic composition";
const GOOGLE_PROMPT: &str = "A serene beach scene in Bali with crystal clear turquoise water, \
    white sand, palm trees swaying in the breeze, and a traditional Balinese boat in the distance";
const STYLE_PROMPTS: [(ImageStyle, &str); 2] = [
    (
        ImageStyle::Natural,
        "A peaceful morning in Bali with soft natural lighting",
    ),
    (
        ImageStyle::Vivid,
        "A dramatic and vibrant Bali landscape with intense colors",
    ),
];

/// Options for [`run`].
#[derive(Debug, Clone, TypedBuilder)]
#[builder(doc)]
pub struct TextToImageOptions {
    /// DALL-E deployment
    #[builder(setter(into), default = DALL_E_DEPLOYMENT.to_string())]
    pub deployment: String,
    /// Google deployment
    #[builder(setter(into), default = GOOGLE_IMAGE_DEPLOYMENT.to_string())]
    pub google_deployment: String,
    /// Where generated images are written
    #[builder(setter(into), default = default_output_dir())]
    pub output_dir: PathBuf,
}

impl Default for TextToImageOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// DALL-E settings for a wide, dramatic, high-definition image.
pub fn configured_fields() -> CustomFields {
    CustomFields::new()
        .with("size", ImageSize::Landscape)
        .with("style", ImageStyle::Vivid)
        .with("quality", ImageQuality::Hd)
        .with("n", 1)
}

/// Google image generation settings; note the different parameter names.
pub fn google_fields() -> CustomFields {
    CustomFields::new()
        .with("aspectRatio", "16:9")
        .with("seed", 42)
        .with("guidanceScale", 7.5)
}

/// DALL-E settings for a square image in the given style.
pub fn style_fields(style: ImageStyle) -> CustomFields {
    CustomFields::new()
        .with("size", ImageSize::Square)
        .with("style", style)
        .with("quality", ImageQuality::Hd)
}

/// Generates one image and saves whatever attachments come back.
pub async fn generate_and_save(
    model: &dyn ModelClient,
    bucket: &dyn BucketConnector,
    deployment: &str,
    prompt: &str,
    custom_fields: Option<&CustomFields>,
    output_dir: &Path,
) -> Result<String, DialError> {
    let response = model
        .get_completion(deployment, &[Message::user(prompt)], custom_fields)
        .await?;
    info!(%deployment, content = %response.content, "image generation completed");

    let attachments = response.attachments();
    if attachments.is_empty() {
        warn!(%deployment, "no attachments found in response");
        return Ok("completed without attachments".to_string());
    }

    info!(count = attachments.len(), "found generated image(s)");
    let saved = images::save_images(bucket, attachments, output_dir).await?;
    Ok(format!(
        "saved {} of {} image(s), {} skipped, {} failed",
        saved.saved().len(),
        attachments.len(),
        saved.skipped(),
        saved.failures().len()
    ))
}

/// Runs the plain, configured, Google and style-variation generations in order.
pub async fn run(
    model: &dyn ModelClient,
    bucket: &dyn BucketConnector,
    options: &TextToImageOptions,
) -> WorkflowReport {
    let mut report = WorkflowReport::new("text-to-image");
    let output_dir = options.output_dir.as_path();

    info!(prompt = BASIC_PROMPT, "generating image");
    report.record(
        "generate",
        generate_and_save(model, bucket, &options.deployment, BASIC_PROMPT, None, output_dir).await,
    );

    info!("generating configured image with custom settings");
    let fields = configured_fields();
    report.record(
        "generate-configured",
        generate_and_save(
            model,
            bucket,
            &options.deployment,
            CONFIGURED_PROMPT,
            Some(&fields),
            output_dir,
        )
        .await,
    );

    info!(deployment = %options.google_deployment, "generating image with Google model");
    let fields = google_fields();
    report.record(
        "generate-google",
        generate_and_save(
            model,
            bucket,
            &options.google_deployment,
            GOOGLE_PROMPT,
            Some(&fields),
            output_dir,
        )
        .await,
    );

    for (style, prompt) in STYLE_PROMPTS {
        info!(style = style.as_str(), "generating style variation");
        let fields = style_fields(style);
        report.record(
            format!("style:{}", style.as_str()),
            generate_and_save(
                model,
                bucket,
                &options.deployment,
                prompt,
                Some(&fields),
                output_dir,
            )
            .await,
        );
    }

    report
}
