//! Client implementation for the DIAL chat completions API.

use async_trait::async_trait;
use tracing::debug;

use crate::{
    config::DialConfig,
    error::DialError,
    models::{ChatCompletion, ChatRequest, CompletionResponse, CustomFields, Message},
};

/// Header carrying the DIAL API key
pub(crate) const API_KEY_HEADER: &str = "Api-Key";

/// Something that can answer a list of messages with a completion.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends `messages` to the `deployment` and waits for the completion.
    ///
    /// # Errors
    ///
    /// Returns [`DialError::InvalidMessage`] if a message has an empty part list
    /// and [`DialError::CompletionFailed`] on transport or provider errors.
    async fn get_completion(
        &self,
        deployment: &str,
        messages: &[Message],
        custom_fields: Option<&CustomFields>,
    ) -> Result<CompletionResponse, DialError>;
}

/// A client for the DIAL chat completions endpoint.
#[derive(Debug, Clone)]
pub struct DialModelClient {
    config: DialConfig,
    client: reqwest::Client,
}

impl DialModelClient {
    /// Creates a new client from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DialError::Config`] if the HTTP client cannot be built.
    pub fn new(config: DialConfig) -> Result<Self, DialError> {
        let client = config.http_client()?;
        Ok(Self { config, client })
    }

    /// Creates a new client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `DIAL_API_KEY` is not set or a value is invalid.
    pub fn from_env() -> Result<Self, DialError> {
        Self::new(DialConfig::from_env()?)
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &DialConfig {
        &self.config
    }

    /// Sends the HTTP request and checks the status.
    async fn make_request(
        &self,
        url: &str,
        request: &ChatRequest,
    ) -> Result<reqwest::Response, DialError> {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| DialError::CompletionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(DialError::CompletionFailed(format!(
                "Request failed with status {}: {}",
                status, error_body
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl ModelClient for DialModelClient {
    async fn get_completion(
        &self,
        deployment: &str,
        messages: &[Message],
        custom_fields: Option<&CustomFields>,
    ) -> Result<CompletionResponse, DialError> {
        messages.iter().try_for_each(Message::validate)?;
        let url = self.config.chat_completions_url(deployment);
        let request = ChatRequest::new(messages.to_vec(), custom_fields.cloned());
        debug!(
            deployment,
            messages = messages.len(),
            custom_fields = custom_fields.map_or(0, CustomFields::len),
            "sending chat completion"
        );

        let body = self
            .make_request(&url, &request)
            .await?
            .text()
            .await
            .map_err(|e| DialError::CompletionFailed(e.to_string()))?;

        let completion: ChatCompletion = serde_json::from_str(&body).map_err(|e| {
            DialError::CompletionFailed(format!(
                "Failed to parse response: {}. Response: {}",
                e, body
            ))
        })?;

        completion.into_response().ok_or_else(|| {
            DialError::CompletionFailed(format!("{} returned no choices", deployment))
        })
    }
}
