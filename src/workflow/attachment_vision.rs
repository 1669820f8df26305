//! Image understanding through an attachment uploaded to the bucket.

use std::path::{Path, PathBuf};

use tracing::info;
use typed_builder::TypedBuilder;

use super::{
    default_image_path, image_mime_type, WorkflowReport, DEFAULT_VISION_DEPLOYMENT,
    DESCRIBE_PROMPT,
};
use crate::{
    client::ModelClient,
    error::DialError,
    file::{self, BucketConnector},
    models::{Attachment, Message},
};

/// Deployments compared against each other by default
pub const COMPARISON_MODELS: [&str; 3] = [
    "gpt-4o-mini",
    "claude-3-5-sonnet-20241022",
    "gemini-1.5-pro-002",
];
/// Prompt for the comparison steps
pub const ONE_SENTENCE_PROMPT: &str = "Describe this image in one sentence.";
/// Prompt for the two-image step
pub const COMPARE_IMAGES_PROMPT: &str =
    "Compare these two images. What similarities and differences do you notice?";

/// Options for [`run`].
#[derive(Debug, Clone, TypedBuilder)]
#[builder(doc)]
pub struct AttachmentVisionOptions {
    /// Deployment used for the main and two-image steps
    #[builder(setter(into), default = DEFAULT_VISION_DEPLOYMENT.to_string())]
    pub deployment: String,
    /// Local image to upload
    #[builder(setter(into), default = default_image_path())]
    pub image_path: PathBuf,
    /// Deployments asked the one-sentence question, in order
    #[builder(default = COMPARISON_MODELS.iter().map(|m| m.to_string()).collect())]
    pub compare_models: Vec<String>,
}

impl Default for AttachmentVisionOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Uploads a local image and returns it as an attachment.
pub async fn put_image(
    bucket: &dyn BucketConnector,
    image_path: &Path,
) -> Result<Attachment, DialError> {
    let name = image_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();
    let mime_type = image_mime_type(image_path);
    let content = tokio::fs::read(image_path).await?;
    file::upload(bucket, content, &name, &mime_type).await
}

async fn ask(
    model: &dyn ModelClient,
    deployment: &str,
    prompt: &str,
    attachments: Vec<Attachment>,
) -> Result<String, DialError> {
    let message = Message::builder()
        .text(prompt)
        .attachments(attachments)
        .build()?;
    let response = model.get_completion(deployment, &[message], None).await?;
    Ok(response.content)
}

/// Uploads an image, asks about it, compares several models and then asks
/// about two attachments at once.
pub async fn run(
    model: &dyn ModelClient,
    bucket: &dyn BucketConnector,
    options: &AttachmentVisionOptions,
) -> WorkflowReport {
    let mut report = WorkflowReport::new("attachment-vision");
    let compare_steps: Vec<String> = options
        .compare_models
        .iter()
        .map(|m| format!("compare:{}", m))
        .collect();

    info!(path = %options.image_path.display(), "uploading image to DIAL bucket");
    let attachment = match put_image(bucket, &options.image_path).await {
        Ok(attachment) => {
            report.record(
                "upload",
                Ok(format!(
                    "title={} url={} type={}",
                    attachment.display_title(),
                    attachment.url.as_deref().unwrap_or_default(),
                    attachment.mime_type.as_deref().unwrap_or_default()
                )),
            );
            attachment
        }
        Err(err) => {
            report.record("upload", Err(err));
            for step in std::iter::once("analyze".to_string())
                .chain(compare_steps)
                .chain(std::iter::once("multi-attachment".to_string()))
            {
                report.skip(step, "image upload failed");
            }
            return report;
        }
    };

    info!(deployment = %options.deployment, "analyzing uploaded image");
    report.record(
        "analyze",
        ask(model, &options.deployment, DESCRIBE_PROMPT, vec![attachment.clone()]).await,
    );

    for (deployment, step) in options.compare_models.iter().zip(compare_steps) {
        info!(%deployment, "testing model");
        report.record(
            step,
            ask(model, deployment, ONE_SENTENCE_PROMPT, vec![attachment.clone()]).await,
        );
    }

    info!("testing with multiple attachments");
    let multi = async {
        let second = put_image(bucket, &options.image_path).await?;
        ask(
            model,
            &options.deployment,
            COMPARE_IMAGES_PROMPT,
            vec![attachment.clone(), second],
        )
        .await
    };
    report.record("multi-attachment", multi.await);

    report
}
