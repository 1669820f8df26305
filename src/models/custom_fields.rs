//! Provider-specific generation parameters.
//!
//! Each provider behind the gateway defines its own parameter set, so the map is
//! passed through untouched. The DALL-E option enums below are conveniences that
//! turn into plain strings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DialError;

/// A string-keyed map of opaque provider parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomFields(Map<String, Value>);

impl CustomFields {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a field, returning the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Looks up a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl TryFrom<Value> for CustomFields {
    type Error = DialError;

    /// Accepts any JSON object; only the shape is checked.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(DialError::Config(format!(
                "custom fields must be a JSON object, got {}",
                other
            ))),
        }
    }
}

impl From<Map<String, Value>> for CustomFields {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for CustomFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// The size of a DALL-E generated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    /// 1024x1024
    Square,
    /// 1024x1792
    Portrait,
    /// 1792x1024
    Landscape,
}

impl ImageSize {
    /// The value DALL-E expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1024x1024",
            Self::Portrait => "1024x1792",
            Self::Landscape => "1792x1024",
        }
    }
}

/// The style of a DALL-E generated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStyle {
    /// Softer, less hyper-real images
    Natural,
    /// Hyper-real, dramatic images
    Vivid,
}

impl ImageStyle {
    /// The value DALL-E expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Natural => "natural",
            Self::Vivid => "vivid",
        }
    }
}

/// The quality of a DALL-E generated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageQuality {
    /// Default quality
    Standard,
    /// Finer details and greater consistency
    Hd,
}

impl ImageQuality {
    /// The value DALL-E expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Hd => "hd",
        }
    }
}

macro_rules! impl_into_value {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(option: $ty) -> Self {
                Value::String(option.as_str().to_string())
            }
        })*
    };
}

impl_into_value!(ImageSize, ImageStyle, ImageQuality);
