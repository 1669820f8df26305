#![deny(missing_docs)]

//! A Rust client library for multimodal chat on the DIAL AI gateway.
//!
//! This library builds text and image messages, uploads and downloads bucket
//! attachments, and requests image generation with provider-specific settings.
//! The [`workflow`] module strings these together into runnable demos.

pub mod client;
pub mod config;
pub mod error;
pub mod file;
pub mod images;
pub mod models;
pub mod workflow;

pub use client::{DialModelClient, ModelClient};
pub use config::DialConfig;
pub use error::DialError;
pub use file::{BucketConnector, BucketSession, DialBucketClient};
