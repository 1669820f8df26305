//! Bucket file references attached to messages and responses.

use serde::{Deserialize, Serialize};

/// Extension used when the MIME type says nothing useful.
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";

/// A reference to a binary resource stored in a DIAL bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// Display name, usually the original file name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Storage location, set after upload or by the provider after generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// MIME type of the resource
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl Attachment {
    /// Creates an attachment that has not been uploaded yet.
    pub fn new(title: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            url: None,
            mime_type: Some(mime_type.into()),
        }
    }

    /// Sets the resolved storage URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// The URL, if present and non-empty.
    pub fn resolved_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// File extension inferred from the MIME type.
    pub fn extension(&self) -> &'static str {
        self.mime_type
            .as_deref()
            .map(extension_for_mime)
            .unwrap_or(DEFAULT_IMAGE_EXTENSION)
    }

    /// Title for log output.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("untitled")
    }
}

/// Maps an image MIME type to a file extension, falling back to `png`.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    let mime_type = mime_type.to_ascii_lowercase();
    if mime_type.contains("jpeg") || mime_type.contains("jpg") {
        "jpg"
    } else if mime_type.contains("png") {
        "png"
    } else if mime_type.contains("webp") {
        "webp"
    } else {
        DEFAULT_IMAGE_EXTENSION
    }
}

/// DIAL-specific content carried next to the message text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomContent {
    /// Attached resources
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl CustomContent {
    /// Wraps a list of attachments.
    pub fn with_attachments(attachments: Vec<Attachment>) -> Self {
        Self { attachments }
    }
}
