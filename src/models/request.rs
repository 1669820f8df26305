//! Request models for the DIAL chat completions endpoint.

use serde::Serialize;

use super::{CustomFields, Message};

/// A chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// The conversation, in order
    pub messages: Vec<Message>,
    /// Provider parameters, nested the way the gateway's adapters read them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<RequestCustomFields>,
}

/// The `custom_fields` envelope of a request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestCustomFields {
    /// Provider configuration, passed through unchanged
    pub configuration: CustomFields,
}

impl ChatRequest {
    /// Creates a request for the given messages.
    ///
    /// # Arguments
    ///
    /// * `messages` - The conversation to send
    /// * `custom_fields` - Optional provider parameters; an empty map is omitted
    pub fn new(messages: Vec<Message>, custom_fields: Option<CustomFields>) -> Self {
        Self {
            messages,
            custom_fields: custom_fields
                .filter(|fields| !fields.is_empty())
                .map(|configuration| RequestCustomFields { configuration }),
        }
    }
}

impl From<Vec<Message>> for ChatRequest {
    fn from(messages: Vec<Message>) -> Self {
        Self::new(messages, None)
    }
}
