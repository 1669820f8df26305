//! Content parts of a multimodal message and image reference resolution.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::DialError;

const DATA_URL_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// One typed piece of a multimodal message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// A text part containing a string value
    Text {
        /// The text content of the part
        text: String,
    },
    /// A part referencing an image
    ImageUrl {
        /// The image reference
        image_url: ImageUrl,
    },
}

impl ContentPart {
    /// Creates a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Creates an image part.
    pub fn image(image_url: ImageUrl) -> Self {
        Self::ImageUrl { image_url }
    }
}

/// An image reference: an http(s) URL or a base64 `data:` URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// The URL of the image
    pub url: String,
    /// Optional detail hint for vision models ("low", "high", "auto")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// An [`ImageUrl`] resolved back into its two supported forms.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource<'a> {
    /// An externally reachable image, used as is
    Remote(&'a str),
    /// Image bytes that travel inside the request
    Inline {
        /// Declared MIME type, e.g. `image/png`
        mime_type: &'a str,
        /// Decoded image bytes
        data: Vec<u8>,
    },
}

impl ImageUrl {
    /// References an image that is already hosted.
    ///
    /// # Errors
    ///
    /// Returns [`DialError::InvalidImage`] unless the URL parses with an http or https scheme.
    pub fn remote(url: impl Into<String>) -> Result<Self, DialError> {
        let url = url.into();
        let parsed = url::Url::parse(&url)
            .map_err(|e| DialError::InvalidImage(format!("{:?} is not a URL: {}", url, e)))?;
        match parsed.scheme() {
            "http" | "https" => Ok(Self { url, detail: None }),
            other => Err(DialError::InvalidImage(format!(
                "unsupported URL scheme {:?}",
                other
            ))),
        }
    }

    /// Embeds image bytes as `data:<mime>;base64,<data>`.
    pub fn inline(bytes: &[u8], mime_type: &str) -> Self {
        Self {
            url: format!(
                "{}{}{}{}",
                DATA_URL_PREFIX,
                mime_type,
                BASE64_MARKER,
                STANDARD.encode(bytes)
            ),
            detail: None,
        }
    }

    /// Reads a local image and embeds it, guessing the MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, DialError> {
        let path = path.as_ref();
        let mime_type = mime_guess::from_path(path)
            .first()
            .ok_or_else(|| DialError::InvalidImage(format!("Unknown MIME type for {:?}", path)))?;
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::inline(&bytes, mime_type.essence_str()))
    }

    /// Sets the detail hint.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Whether the image travels inside the request.
    pub fn is_inline(&self) -> bool {
        self.url.starts_with(DATA_URL_PREFIX)
    }

    /// Resolves the reference, decoding inline payloads.
    ///
    /// # Errors
    ///
    /// Returns [`DialError::InvalidImage`] for a malformed `data:` URL.
    pub fn source(&self) -> Result<ImageSource<'_>, DialError> {
        let Some(rest) = self.url.strip_prefix(DATA_URL_PREFIX) else {
            return Ok(ImageSource::Remote(&self.url));
        };
        let (mime_type, payload) = rest
            .split_once(BASE64_MARKER)
            .ok_or_else(|| DialError::InvalidImage("data URL is not base64 encoded".into()))?;
        if mime_type.is_empty() {
            return Err(DialError::InvalidImage("data URL has no MIME type".into()));
        }
        let data = STANDARD
            .decode(payload)
            .map_err(|e| DialError::InvalidImage(format!("invalid base64 payload: {}", e)))?;
        Ok(ImageSource::Inline { mime_type, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_round_trips_for_supported_subtypes() {
        let bytes: Vec<u8> = (0..=255).collect();
        for mime in ["image/png", "image/jpeg", "image/webp"] {
            let image = ImageUrl::inline(&bytes, mime);
            assert!(image.url.starts_with(&format!("data:{};base64,", mime)));
            match image.source().unwrap() {
                ImageSource::Inline { mime_type, data } => {
                    assert_eq!(mime_type, mime);
                    assert_eq!(data, bytes);
                }
                other => panic!("expected inline source, got {:?}", other),
            }
        }
    }

    #[test]
    fn remote_urls_are_left_untouched() {
        let url = "https://a-z-animals.com/media/2019/11/Elephant-male-1024x535.jpg";
        let image = ImageUrl::remote(url).unwrap();
        assert_eq!(image.url, url);
        assert!(!image.is_inline());
        assert_eq!(image.source().unwrap(), ImageSource::Remote(url));
    }

    #[test]
    fn remote_rejects_other_schemes() {
        assert!(matches!(
            ImageUrl::remote("ftp://example.com/cat.png"),
            Err(DialError::InvalidImage(_))
        ));
        assert!(ImageUrl::remote("not a url").is_err());
    }

    #[test]
    fn malformed_data_url_is_invalid() {
        let image = ImageUrl {
            url: "data:image/png,rawbytes".into(),
            detail: None,
        };
        assert!(matches!(image.source(), Err(DialError::InvalidImage(_))));
    }

    #[test]
    fn image_part_serializes_with_type_tag() {
        let part = ContentPart::image(ImageUrl::inline(b"x", "image/png"));
        let value = serde_json::to_value(&part).unwrap();
        assert_eq!(value["type"], "image_url");
        assert_eq!(value["image_url"]["url"], "data:image/png;base64,eA==");
        assert!(value["image_url"].get("detail").is_none());

        let text = serde_json::to_value(ContentPart::text("hi")).unwrap();
        assert_eq!(text, serde_json::json!({"type": "text", "text": "hi"}));
    }

    #[tokio::test]
    async fn from_path_guesses_mime_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banner.png");
        tokio::fs::write(&path, [1u8, 2, 3]).await.unwrap();

        let image = ImageUrl::from_path(&path).await.unwrap();
        assert_eq!(image.url, "data:image/png;base64,AQID");
    }
}
