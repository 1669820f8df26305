//! Chat messages in text-only or multimodal form.

use serde::{Deserialize, Serialize};

use super::{Attachment, ContentPart, CustomContent, Role};
use crate::error::DialError;

/// The body of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// A single plain-text string
    Text(String),
    /// An ordered, non-empty list of typed parts
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Concatenated text of all text parts.
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// A single chat message.
///
/// The fields are public and deserialization accepts any content, so a message
/// built outside [`MessageBuilder`] may break the content rules.
/// [`Message::validate`] checks them again and runs before every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The author of the message
    pub role: Role,
    /// Text or multimodal parts
    pub content: MessageContent,
    /// Attachments passed alongside the content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_content: Option<CustomContent>,
}

impl Message {
    /// Starts building a message.
    pub fn builder() -> MessageBuilder {
        MessageBuilder::default()
    }

    /// A plain-text user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::text(Role::User, text)
    }

    /// A plain-text system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self::text(Role::System, text)
    }

    /// A plain-text message.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(text.into()),
            custom_content: None,
        }
    }

    /// A multimodal message.
    ///
    /// # Errors
    ///
    /// Returns [`DialError::InvalidMessage`] when `parts` is empty.
    pub fn from_parts(role: Role, parts: Vec<ContentPart>) -> Result<Self, DialError> {
        Self::builder().role(role).parts(parts).build()
    }

    /// Checks that multimodal content has at least one part.
    ///
    /// # Errors
    ///
    /// Returns [`DialError::InvalidMessage`] for an empty part list.
    pub fn validate(&self) -> Result<(), DialError> {
        match &self.content {
            MessageContent::Parts(parts) if parts.is_empty() => Err(DialError::invalid_message(
                "multimodal message must contain at least one content part",
            )),
            _ => Ok(()),
        }
    }

    /// Attachments carried in custom content.
    pub fn attachments(&self) -> &[Attachment] {
        self.custom_content
            .as_ref()
            .map(|c| c.attachments.as_slice())
            .unwrap_or_default()
    }
}

/// Builder for [`Message`] that enforces the content invariants on `build`.
#[derive(Debug, Default)]
pub struct MessageBuilder {
    role: Option<Role>,
    text: Option<String>,
    parts: Option<Vec<ContentPart>>,
    attachments: Vec<Attachment>,
}

impl MessageBuilder {
    /// Sets the role; defaults to [`Role::User`].
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Uses the text-only form.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Uses the multimodal form with the given parts.
    pub fn parts(mut self, parts: Vec<ContentPart>) -> Self {
        self.parts = Some(parts);
        self
    }

    /// Appends one part, switching to the multimodal form.
    pub fn part(mut self, part: ContentPart) -> Self {
        self.parts.get_or_insert_with(Vec::new).push(part);
        self
    }

    /// Adds an attachment to the custom content.
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Adds several attachments to the custom content.
    pub fn attachments(mut self, attachments: impl IntoIterator<Item = Attachment>) -> Self {
        self.attachments.extend(attachments);
        self
    }

    /// Builds the message.
    ///
    /// # Errors
    ///
    /// Returns [`DialError::InvalidMessage`] when neither or both content forms
    /// were given, or when the part list is empty.
    pub fn build(self) -> Result<Message, DialError> {
        let content = match (self.text, self.parts) {
            (Some(text), None) => MessageContent::Text(text),
            (None, Some(parts)) => MessageContent::Parts(parts),
            (None, None) => {
                return Err(DialError::invalid_message(
                    "message needs either text or content parts",
                ))
            }
            (Some(_), Some(_)) => {
                return Err(DialError::invalid_message(
                    "message cannot have both text and content parts",
                ))
            }
        };

        let custom_content = if self.attachments.is_empty() {
            None
        } else {
            Some(CustomContent::with_attachments(self.attachments))
        };

        let message = Message {
            role: self.role.unwrap_or(Role::User),
            content,
            custom_content,
        };
        message.validate()?;
        Ok(message)
    }
}
