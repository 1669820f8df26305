use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dial_multimodal::{
    workflow::{
        attachment_vision::{self, AttachmentVisionOptions},
        image_to_text::{self, ImageToTextOptions},
        text_to_image::{self, TextToImageOptions},
        WorkflowReport,
    },
    DialBucketClient, DialConfig, DialError, DialModelClient,
};

/// Multimodal demos against the DIAL AI gateway
#[derive(Parser)]
#[command(name = "dial-multimodal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask a vision model about a base64 image and a remote image URL
    ImageToText {
        /// Local image sent inline
        #[arg(long)]
        image: Option<PathBuf>,
        /// Hosted image referenced by URL
        #[arg(long)]
        url: Option<String>,
        /// Vision deployment
        #[arg(long)]
        model: Option<String>,
    },
    /// Upload an image to the bucket and ask several models about it
    AttachmentVision {
        /// Local image to upload
        #[arg(long)]
        image: Option<PathBuf>,
        /// Main vision deployment
        #[arg(long)]
        model: Option<String>,
        /// Deployments to compare (repeatable)
        #[arg(long = "compare")]
        compare: Vec<String>,
    },
    /// Generate images and save them locally
    TextToImage {
        /// Directory for generated images
        #[arg(long, env = "DIAL_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,
    },
    /// Run every workflow with default settings
    All,
}

fn print_report(report: &WorkflowReport) {
    println!("\n{}\n", report);
}

#[tokio::main]
async fn main() -> Result<(), DialError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = DialConfig::from_env()?;
    let model = DialModelClient::new(config.clone())?;
    let bucket = DialBucketClient::new(config.clone());

    match cli.command {
        Command::ImageToText { image, url, model: deployment } => {
            let mut options = ImageToTextOptions::default();
            if let Some(image) = image {
                options.image_path = image;
            }
            if let Some(url) = url {
                options.remote_url = url;
            }
            if let Some(deployment) = deployment {
                options.deployment = deployment;
            }
            print_report(&image_to_text::run(&model, &options).await);
        }
        Command::AttachmentVision {
            image,
            model: deployment,
            compare,
        } => {
            let mut options = AttachmentVisionOptions::default();
            if let Some(image) = image {
                options.image_path = image;
            }
            if let Some(deployment) = deployment {
                options.deployment = deployment;
            }
            if !compare.is_empty() {
                options.compare_models = compare;
            }
            print_report(&attachment_vision::run(&model, &bucket, &options).await);
        }
        Command::TextToImage { output_dir } => {
            let options = TextToImageOptions::builder()
                .output_dir(output_dir.unwrap_or_else(|| config.output_dir.clone()))
                .build();
            print_report(&text_to_image::run(&model, &bucket, &options).await);
        }
        Command::All => {
            print_report(&image_to_text::run(&model, &ImageToTextOptions::default()).await);
            print_report(
                &attachment_vision::run(&model, &bucket, &AttachmentVisionOptions::default())
                    .await,
            );
            let options = TextToImageOptions::builder()
                .output_dir(config.output_dir.clone())
                .build();
            print_report(&text_to_image::run(&model, &bucket, &options).await);
        }
    }

    Ok(())
}
