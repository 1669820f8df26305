#![allow(dead_code)]

//! In-memory stand-ins for the gateway used by the integration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dial_multimodal::{
    file::FileMetadata,
    models::{CompletionResponse, CustomFields, Message},
    BucketConnector, BucketSession, DialError, ModelClient,
};

/// One recorded completion call.
#[derive(Debug, Clone)]
pub struct Call {
    pub deployment: String,
    pub messages: Vec<Message>,
    pub custom_fields: Option<CustomFields>,
}

/// A model client that answers from a script and records every call.
#[derive(Default)]
pub struct FakeModel {
    replies: HashMap<String, Result<CompletionResponse, String>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, deployment: &str, response: CompletionResponse) -> Self {
        self.replies.insert(deployment.to_string(), Ok(response));
        self
    }

    pub fn fail(mut self, deployment: &str, message: &str) -> Self {
        self.replies
            .insert(deployment.to_string(), Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for FakeModel {
    async fn get_completion(
        &self,
        deployment: &str,
        messages: &[Message],
        custom_fields: Option<&CustomFields>,
    ) -> Result<CompletionResponse, DialError> {
        self.calls.lock().unwrap().push(Call {
            deployment: deployment.to_string(),
            messages: messages.to_vec(),
            custom_fields: custom_fields.cloned(),
        });
        match self.replies.get(deployment) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(message)) => Err(DialError::CompletionFailed(message.clone())),
            None => Ok(CompletionResponse::text(format!("{} says hello", deployment))),
        }
    }
}

#[derive(Default)]
struct BucketState {
    files: Mutex<HashMap<String, Vec<u8>>>,
    opened: AtomicUsize,
    closed: AtomicUsize,
    fail_connect: AtomicBool,
    fail_upload: AtomicBool,
    omit_url: AtomicBool,
}

/// A bucket kept in memory that counts opened and released sessions.
#[derive(Clone, Default)]
pub struct MemoryBucket {
    state: Arc<BucketState>,
}

impl MemoryBucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: &str, bytes: &[u8]) {
        self.state
            .files
            .lock()
            .unwrap()
            .insert(url.to_string(), bytes.to_vec());
    }

    pub fn file_count(&self) -> usize {
        self.state.files.lock().unwrap().len()
    }

    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }

    pub fn fail_connect(&self) {
        self.state.fail_connect.store(true, Ordering::SeqCst);
    }

    pub fn fail_upload(&self) {
        self.state.fail_upload.store(true, Ordering::SeqCst);
    }

    pub fn omit_url(&self) {
        self.state.omit_url.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl BucketConnector for MemoryBucket {
    async fn connect(&self) -> Result<Box<dyn BucketSession>, DialError> {
        if self.state.fail_connect.load(Ordering::SeqCst) {
            return Err(DialError::Connection("bucket offline".into()));
        }
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySession {
            state: self.state.clone(),
        }))
    }
}

struct MemorySession {
    state: Arc<BucketState>,
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.state.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl BucketSession for MemorySession {
    async fn put_file(
        &self,
        name: &str,
        mime_type: &str,
        content: Vec<u8>,
    ) -> Result<FileMetadata, DialError> {
        if self.state.fail_upload.load(Ordering::SeqCst) {
            return Err(DialError::UploadFailed("bucket is read-only".into()));
        }
        let count = self.state.files.lock().unwrap().len();
        let url = format!("files/test-bucket/{}/{}", count, name);
        let size = content.len() as u64;
        self.state.files.lock().unwrap().insert(url.clone(), content);

        let url = if self.state.omit_url.load(Ordering::SeqCst) {
            None
        } else {
            Some(url)
        };
        Ok(FileMetadata {
            name: Some(name.to_string()),
            bucket: Some("test-bucket".into()),
            url,
            content_length: Some(size),
            content_type: Some(mime_type.to_string()),
            ..Default::default()
        })
    }

    async fn get_file(&self, url: &str) -> Result<Vec<u8>, DialError> {
        self.state
            .files
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| DialError::DownloadFailed(format!("resource not found: {}", url)))
    }
}
