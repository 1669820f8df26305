//! Demo workflows built on the model and bucket clients.
//!
//! Each workflow is an explicit `run` function. Steps that talk to the network
//! are isolated: a failure is recorded in the [`WorkflowReport`] and the
//! remaining independent steps still run.

pub mod attachment_vision;
pub mod image_to_text;
pub mod text_to_image;

mod report;

use std::path::{Path, PathBuf};

pub use report::{StepReport, StepStatus, WorkflowReport};

use crate::{
    client::ModelClient,
    error::DialError,
    models::{ContentPart, ImageUrl, Message, Role},
};

/// Prompt used to ask a model about an image
pub const DESCRIBE_PROMPT: &str = "What do you see on this picture?";
/// Local image the demos read by default
pub const DEFAULT_IMAGE: &str = "dialx-banner.png";
/// Vision-capable deployment used by default
pub const DEFAULT_VISION_DEPLOYMENT: &str = "gpt-4o";

pub(crate) fn default_image_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_IMAGE)
}

/// MIME type of a local image, falling back to `image/png`.
pub(crate) fn image_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| "image/png".to_string())
}

/// Asks `deployment` about one image and returns the answer text.
pub(crate) async fn describe_image(
    model: &dyn ModelClient,
    deployment: &str,
    prompt: &str,
    image: ImageUrl,
) -> Result<String, DialError> {
    let message = Message::builder()
        .role(Role::User)
        .part(ContentPart::text(prompt))
        .part(ContentPart::image(image))
        .build()?;
    let response = model.get_completion(deployment, &[message], None).await?;
    Ok(response.content)
}
