//! Image understanding with inline (base64) and remote (URL) images.

use std::path::PathBuf;

use tracing::info;
use typed_builder::TypedBuilder;

use super::{
    default_image_path, describe_image, WorkflowReport, DEFAULT_VISION_DEPLOYMENT, DESCRIBE_PROMPT,
};
use crate::{client::ModelClient, models::ImageUrl};

/// Publicly hosted image used for the URL step
pub const ELEPHANT_URL: &str = "https://a-z-animals.com/media/2019/11/Elephant-male-1024x535.jpg";

/// Options for [`run`].
#[derive(Debug, Clone, TypedBuilder)]
#[builder(doc)]
pub struct ImageToTextOptions {
    /// Vision deployment to ask
    #[builder(setter(into), default = DEFAULT_VISION_DEPLOYMENT.to_string())]
    pub deployment: String,
    /// Local image sent inline
    #[builder(setter(into), default = default_image_path())]
    pub image_path: PathBuf,
    /// Hosted image referenced by URL
    #[builder(setter(into), default = ELEPHANT_URL.to_string())]
    pub remote_url: String,
    /// Question asked about both images
    #[builder(setter(into), default = DESCRIBE_PROMPT.to_string())]
    pub prompt: String,
}

impl Default for ImageToTextOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Asks the model about a local image sent as base64, then about a remote URL.
pub async fn run(model: &dyn ModelClient, options: &ImageToTextOptions) -> WorkflowReport {
    let mut report = WorkflowReport::new("image-to-text");

    info!(path = %options.image_path.display(), "analyzing local image (base64 encoded)");
    let inline = async {
        let image = ImageUrl::from_path(&options.image_path).await?;
        describe_image(model, &options.deployment, &options.prompt, image).await
    };
    report.record("base64-image", inline.await);

    info!(url = %options.remote_url, "analyzing remote image (URL)");
    let remote = async {
        let image = ImageUrl::remote(options.remote_url.as_str())?;
        describe_image(model, &options.deployment, &options.prompt, image).await
    };
    report.record("url-image", remote.await);

    report
}
