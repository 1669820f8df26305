//! Error types for the DIAL client.

use thiserror::Error;

/// Errors that can occur when talking to the DIAL gateway.
#[derive(Debug, Error)]
pub enum DialError {
    /// A message was constructed without valid content.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// An image reference could not be built or resolved.
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Uploading a file to the bucket failed.
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Downloading a file from the bucket failed.
    #[error("Download failed: {0}")]
    DownloadFailed(String),

    /// A bucket session could not be opened.
    #[error("Bucket connection failed: {0}")]
    Connection(String),

    /// The completion call failed at the transport or provider level.
    #[error("Completion failed: {0}")]
    CompletionFailed(String),

    /// A configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Error occurred when accessing environment variables.
    #[error("Environment variable not found: {0}")]
    EnvError(#[from] std::env::VarError),

    /// Error occurred when reading or writing local files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error occurred when parsing JSON.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl DialError {
    /// Creates an [`DialError::InvalidMessage`] with the given message.
    pub fn invalid_message(message: impl Into<String>) -> Self {
        Self::InvalidMessage(message.into())
    }

    /// Whether the workflow may skip the affected item and continue.
    ///
    /// Construction errors mean the caller is wrong and should be fixed instead.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UploadFailed(_)
                | Self::DownloadFailed(_)
                | Self::Connection(_)
                | Self::CompletionFailed(_)
                | Self::Io(_)
        )
    }
}
