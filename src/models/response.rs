//! Response models for the DIAL chat completions endpoint.

use serde::Deserialize;

use super::{Attachment, CustomContent, Role};

/// The raw body returned by the chat completions endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    /// Completion identifier
    #[serde(default)]
    pub id: Option<String>,
    /// The model that served the request
    #[serde(default)]
    pub model: Option<String>,
    /// The generated choices
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Token usage, when the provider reports it
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// A generated choice.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// Position of this choice
    #[serde(default)]
    pub index: u32,
    /// The generated message
    pub message: ResponseMessage,
    /// Why generation stopped
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The message inside a choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Usually [`Role::Assistant`]
    #[serde(default)]
    pub role: Option<Role>,
    /// Generated text; image generators may return none
    #[serde(default)]
    pub content: Option<String>,
    /// Generated attachments
    #[serde(default)]
    pub custom_content: Option<CustomContent>,
}

/// Token usage for a completion.
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt
    #[serde(default)]
    pub prompt_tokens: u64,
    /// Tokens in the completion
    #[serde(default)]
    pub completion_tokens: u64,
    /// Total tokens
    #[serde(default)]
    pub total_tokens: u64,
}

/// The result of a completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Response text
    pub content: String,
    /// Attachments produced by the model, e.g. generated images
    pub custom_content: Option<CustomContent>,
}

impl CompletionResponse {
    /// Creates a text-only response.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            custom_content: None,
        }
    }

    /// Returns the attachments, empty when there are none.
    pub fn attachments(&self) -> &[Attachment] {
        self.custom_content
            .as_ref()
            .map(|c| c.attachments.as_slice())
            .unwrap_or_default()
    }
}

impl ChatCompletion {
    /// Flattens the first choice. Returns `None` when there are no choices.
    pub fn into_response(self) -> Option<CompletionResponse> {
        let choice = self.choices.into_iter().next()?;
        Some(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            custom_content: choice.message.custom_content,
        })
    }
}
