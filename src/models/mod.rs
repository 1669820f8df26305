//! Data structures for DIAL chat requests and responses.

mod attachment;
mod custom_fields;
mod message;
mod part;
mod request;
mod response;
mod role;

pub use attachment::{extension_for_mime, Attachment, CustomContent, DEFAULT_IMAGE_EXTENSION};
pub use custom_fields::{CustomFields, ImageQuality, ImageSize, ImageStyle};
pub use message::{Message, MessageBuilder, MessageContent};
pub use part::{ContentPart, ImageSource, ImageUrl};
pub use request::{ChatRequest, RequestCustomFields};
pub use response::{ChatCompletion, Choice, CompletionResponse, ResponseMessage, Usage};
pub use role::Role;
