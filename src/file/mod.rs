//! File storage in DIAL buckets.
//!
//! Access to a bucket is scoped: [`BucketConnector::connect`] opens a
//! [`BucketSession`], and dropping the session releases it. [`upload`] and
//! [`download`] hold a session only for the duration of one transfer.

use async_trait::async_trait;
use reqwest::multipart;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::API_KEY_HEADER;
use crate::config::DialConfig;
use crate::error::DialError;
use crate::models::Attachment;

const FILE_API_VERSION: &str = "v1";

/// Metadata the gateway returns for a stored file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// File name inside the bucket
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Folder path inside the bucket
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_path: Option<String>,
    /// Bucket identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    /// Reference URL used to attach or download the file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Size of the file in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_length: Option<u64>,
    /// MIME type of the stored content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Any other fields returned by the gateway
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Opens scoped sessions against a bucket.
#[async_trait]
pub trait BucketConnector: Send + Sync {
    /// Opens a session. The session is released when dropped.
    async fn connect(&self) -> Result<Box<dyn BucketSession>, DialError>;
}

/// An open connection to a bucket.
#[async_trait]
pub trait BucketSession: Send + Sync {
    /// Stores `content` under `name` and returns the gateway's metadata.
    async fn put_file(
        &self,
        name: &str,
        mime_type: &str,
        content: Vec<u8>,
    ) -> Result<FileMetadata, DialError>;

    /// Fetches the raw bytes behind a file reference.
    async fn get_file(&self, url: &str) -> Result<Vec<u8>, DialError>;
}

/// Uploads bytes and returns an attachment pointing at the stored file.
///
/// # Errors
///
/// Returns [`DialError::UploadFailed`] when the session cannot be opened, the
/// transfer fails, or the gateway returns no URL.
pub async fn upload(
    connector: &dyn BucketConnector,
    content: Vec<u8>,
    name: &str,
    mime_type: &str,
) -> Result<Attachment, DialError> {
    let session = connector.connect().await.map_err(upload_error)?;
    let metadata = session
        .put_file(name, mime_type, content)
        .await
        .map_err(upload_error)?;
    drop(session);

    let url = metadata
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| DialError::UploadFailed("No URL returned from file upload".into()))?;

    Ok(Attachment::new(name, mime_type).with_url(url))
}

/// Downloads the raw bytes behind a file reference.
///
/// # Errors
///
/// Returns [`DialError::DownloadFailed`] on transport errors or a missing resource.
pub async fn download(connector: &dyn BucketConnector, url: &str) -> Result<Vec<u8>, DialError> {
    let session = connector.connect().await.map_err(download_error)?;
    session.get_file(url).await.map_err(download_error)
}

fn upload_error(err: DialError) -> DialError {
    match err {
        err @ DialError::UploadFailed(_) => err,
        other => DialError::UploadFailed(other.to_string()),
    }
}

pub(crate) fn download_error(err: DialError) -> DialError {
    match err {
        err @ DialError::DownloadFailed(_) => err,
        other => DialError::DownloadFailed(other.to_string()),
    }
}

/// Connector for the DIAL file API.
#[derive(Debug, Clone)]
pub struct DialBucketClient {
    config: DialConfig,
}

impl DialBucketClient {
    /// Creates a new bucket client.
    ///
    /// # Example
    ///
    /// ```
    /// use dial_multimodal::{config::DialConfig, file::DialBucketClient};
    ///
    /// let config = DialConfig::builder().api_key("your-api-key-here").build();
    /// let bucket_client = DialBucketClient::new(config);
    /// ```
    pub fn new(config: DialConfig) -> Self {
        Self { config }
    }

    /// Creates a new bucket client from environment variables.
    pub fn from_env() -> Result<Self, DialError> {
        Ok(Self::new(DialConfig::from_env()?))
    }
}

#[async_trait]
impl BucketConnector for DialBucketClient {
    async fn connect(&self) -> Result<Box<dyn BucketSession>, DialError> {
        let client = self.config.http_client()?;
        let url = format!("{}/{}/bucket", self.config.base_url, FILE_API_VERSION);
        let response = client
            .get(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(|e| DialError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(DialError::Connection(format!(
                "Bucket lookup failed with status {}: {}",
                status, error_body
            )));
        }

        #[derive(Deserialize)]
        struct BucketResponse {
            bucket: String,
        }

        let bucket = response
            .json::<BucketResponse>()
            .await
            .map_err(|e| DialError::Connection(format!("Failed to parse bucket: {}", e)))?
            .bucket;

        debug!(%bucket, "opened bucket session");
        Ok(Box::new(DialBucketSession {
            client,
            base_url: self.config.base_url.clone(),
            api_key: self.config.api_key.clone(),
            bucket,
        }))
    }
}

/// An open session against the caller's DIAL bucket.
#[derive(Debug)]
pub struct DialBucketSession {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl DialBucketSession {
    /// The bucket this session writes to.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn file_url(&self, name: &str) -> Result<url::Url, DialError> {
        let mut url = url::Url::parse(&self.base_url)
            .map_err(|e| DialError::UploadFailed(format!("Invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| DialError::UploadFailed(format!("Invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend([FILE_API_VERSION, "files", self.bucket.as_str(), name]);
        Ok(url)
    }

    fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!(
                "{}/{}/{}",
                self.base_url,
                FILE_API_VERSION,
                url.trim_start_matches('/')
            )
        }
    }
}

#[async_trait]
impl BucketSession for DialBucketSession {
    async fn put_file(
        &self,
        name: &str,
        mime_type: &str,
        content: Vec<u8>,
    ) -> Result<FileMetadata, DialError> {
        let url = self.file_url(name)?;
        let size = content.len();
        let part = multipart::Part::bytes(content)
            .file_name(name.to_string())
            .mime_str(mime_type)
            .map_err(|e| DialError::UploadFailed(format!("Invalid MIME type: {}", e)))?;
        let form = multipart::Form::new().part("file", part);

        debug!(name, mime_type, size, "uploading file");
        let response = self
            .client
            .put(url)
            .header(API_KEY_HEADER, &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DialError::UploadFailed(e.to_string()))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| DialError::UploadFailed(e.to_string()))?;
        if !status.is_success() {
            return Err(DialError::UploadFailed(format!(
                "Upload failed with status {}: {}",
                status, response_text
            )));
        }

        serde_json::from_str(&response_text).map_err(|e| {
            DialError::UploadFailed(format!(
                "Failed to parse response: {}. Response: {}",
                e, response_text
            ))
        })
    }

    async fn get_file(&self, url: &str) -> Result<Vec<u8>, DialError> {
        let target = self.resolve_url(url);
        debug!(url, "downloading file");
        let response = self
            .client
            .get(&target)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| DialError::DownloadFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DialError::DownloadFailed(format!(
                "resource not found: {}",
                url
            )));
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(DialError::DownloadFailed(format!(
                "Download failed with status {}: {}",
                status, error_body
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DialError::DownloadFailed(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

impl Drop for DialBucketSession {
    fn drop(&mut self) {
        debug!(bucket = %self.bucket, "closed bucket session");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> DialBucketSession {
        DialBucketSession {
            client: reqwest::Client::new(),
            base_url: "http://dial.local".into(),
            api_key: "key".into(),
            bucket: "b1".into(),
        }
    }

    #[test]
    fn relative_urls_resolve_against_file_api() {
        assert_eq!(
            session().resolve_url("files/b1/image.png"),
            "http://dial.local/v1/files/b1/image.png"
        );
        assert_eq!(
            session().resolve_url("https://cdn.example.com/x.png"),
            "https://cdn.example.com/x.png"
        );
    }

    #[test]
    fn file_names_are_encoded_as_one_segment() {
        assert_eq!(
            session().file_url("dialx-banner.png").unwrap().as_str(),
            "http://dial.local/v1/files/b1/dialx-banner.png"
        );
        assert_eq!(
            session().file_url("a#b?c/d e.png").unwrap().as_str(),
            "http://dial.local/v1/files/b1/a%23b%3Fc%2Fd%20e.png"
        );
    }

    #[test]
    fn metadata_keeps_unknown_fields() {
        let metadata: FileMetadata = serde_json::from_value(serde_json::json!({
            "name": "dialx-banner.png",
            "parentPath": null,
            "bucket": "b1",
            "url": "files/b1/dialx-banner.png",
            "nodeType": "ITEM",
            "resourceType": "FILE",
            "contentLength": 1024,
            "contentType": "image/png"
        }))
        .unwrap();
        assert_eq!(metadata.url.as_deref(), Some("files/b1/dialx-banner.png"));
        assert_eq!(metadata.content_length, Some(1024));
        assert_eq!(metadata.extra["nodeType"], "ITEM");
    }

    #[test]
    fn errors_are_rewrapped_once() {
        let err = upload_error(DialError::Connection("refused".into()));
        assert_eq!(err.to_string(), "Upload failed: Bucket connection failed: refused");
        let err = download_error(DialError::DownloadFailed("gone".into()));
        assert_eq!(err.to_string(), "Download failed: gone");
    }
}
