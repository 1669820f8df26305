//! Saving generated images to local disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::error::DialError;
use crate::file::{download_error, BucketConnector, BucketSession};
use crate::models::Attachment;

const FILE_PREFIX: &str = "generated_image";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const MAX_NAME_ATTEMPTS: usize = 1000;

/// What happened to one attachment of a batch.
#[derive(Debug)]
pub enum ImageOutcome {
    /// The image was written to disk.
    Saved {
        /// Where the image was written
        path: PathBuf,
        /// Number of bytes written
        size: usize,
    },
    /// The attachment had no URL.
    Skipped,
    /// Download or write failed.
    Failed(DialError),
}

/// Per-attachment outcomes of a batch, in input order.
#[derive(Debug, Default)]
pub struct SaveReport {
    /// One outcome per attachment
    pub outcomes: Vec<ImageOutcome>,
}

impl SaveReport {
    /// Paths of the images that were written.
    pub fn saved(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                ImageOutcome::Saved { path, .. } => Some(path.as_path()),
                _ => None,
            })
            .collect()
    }

    /// Number of attachments skipped for lack of a URL.
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, ImageOutcome::Skipped))
            .count()
    }

    /// Errors of the attachments that failed.
    pub fn failures(&self) -> Vec<&DialError> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                ImageOutcome::Failed(err) => Some(err),
                _ => None,
            })
            .collect()
    }
}

/// File name for the image at `index` (0-based) of a batch captured at `captured_at`.
pub fn image_file_name(captured_at: &DateTime<Local>, index: usize, extension: &str) -> String {
    format!("{}.{}", file_stem(captured_at, index), extension)
}

fn file_stem(captured_at: &DateTime<Local>, index: usize) -> String {
    format!(
        "{}_{}_{}",
        FILE_PREFIX,
        captured_at.format(TIMESTAMP_FORMAT),
        index + 1
    )
}

/// Creates a new file for an image, never replacing an existing one.
///
/// When the plain name is taken, `_2`, `_3`, ... is appended to the stem.
async fn create_image_file(
    output_dir: &Path,
    captured_at: &DateTime<Local>,
    index: usize,
    extension: &str,
) -> std::io::Result<(PathBuf, File)> {
    let stem = file_stem(captured_at, index);
    let mut path = output_dir.join(format!("{}.{}", stem, extension));
    for attempt in 2..=MAX_NAME_ATTEMPTS {
        match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => return Ok((path, file)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                path = output_dir.join(format!("{}_{}.{}", stem, attempt, extension));
            }
            Err(err) => return Err(err),
        }
    }
    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free file name for {} in {}", stem, output_dir.display()),
    ))
}

async fn write_image(
    output_dir: &Path,
    captured_at: &DateTime<Local>,
    index: usize,
    extension: &str,
    bytes: &[u8],
) -> std::io::Result<PathBuf> {
    let (path, mut file) = create_image_file(output_dir, captured_at, index, extension).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(path)
}

/// Downloads every attachment with a URL and writes it into `output_dir`.
///
/// Existing files are never overwritten; a taken name gets a numeric suffix.
///
/// # Errors
///
/// Fails only when `output_dir` cannot be created; per-image problems are
/// reported in the [`SaveReport`].
pub async fn save_images(
    connector: &dyn BucketConnector,
    attachments: &[Attachment],
    output_dir: &Path,
) -> Result<SaveReport, DialError> {
    save_images_at(connector, attachments, output_dir, Local::now()).await
}

/// Same as [`save_images`] with an explicit capture time.
pub async fn save_images_at(
    connector: &dyn BucketConnector,
    attachments: &[Attachment],
    output_dir: &Path,
    captured_at: DateTime<Local>,
) -> Result<SaveReport, DialError> {
    tokio::fs::create_dir_all(output_dir).await?;

    let mut report = SaveReport::default();
    if attachments.is_empty() {
        return Ok(report);
    }

    let total = attachments.len();
    let session = if attachments.iter().any(|a| a.resolved_url().is_some()) {
        connector
            .connect()
            .await
            .map_err(|err| format!("cannot open bucket session: {}", err))
    } else {
        Err("no attachment has a URL".to_string())
    };

    for (index, attachment) in attachments.iter().enumerate() {
        let Some(url) = attachment.resolved_url() else {
            warn!(index = index + 1, total, "skipping attachment: no URL provided");
            report.outcomes.push(ImageOutcome::Skipped);
            continue;
        };

        let session = match &session {
            Ok(session) => session,
            Err(reason) => {
                warn!(index = index + 1, %reason, "cannot download image");
                report
                    .outcomes
                    .push(ImageOutcome::Failed(DialError::DownloadFailed(reason.clone())));
                continue;
            }
        };

        info!(
            index = index + 1,
            total,
            title = attachment.display_title(),
            "downloading image"
        );
        let extension = attachment.extension();
        let outcome = match session.get_file(url).await.map_err(download_error) {
            Ok(bytes) => match write_image(output_dir, &captured_at, index, extension, &bytes)
                .await
            {
                Ok(path) => {
                    info!(path = %path.display(), size = bytes.len(), "image saved");
                    ImageOutcome::Saved {
                        path,
                        size: bytes.len(),
                    }
                }
                Err(err) => ImageOutcome::Failed(err.into()),
            },
            Err(err) => ImageOutcome::Failed(err),
        };
        if let ImageOutcome::Failed(err) = &outcome {
            warn!(index = index + 1, error = %err, "failed to save image");
        }
        report.outcomes.push(outcome);
    }

    Ok(report)
}
