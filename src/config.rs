//! Connection settings for the DIAL gateway.

use std::path::PathBuf;
use std::time::Duration;

use typed_builder::TypedBuilder;

use crate::error::DialError;

/// Default gateway URL
pub const DEFAULT_DIAL_URL: &str = "https://ai-proxy.lab.epam.com";
/// Default chat completions path; `{deployment}` is replaced per call
pub const DEFAULT_CHAT_COMPLETIONS_PATH: &str = "/openai/deployments/{deployment}/chat/completions";
/// Name of the directory generated images are written to
pub const GENERATED_IMAGES_DIR: &str = "generated_images";

const DEPLOYMENT_PLACEHOLDER: &str = "{deployment}";

/// Configuration shared by the model and bucket clients.
#[derive(Debug, Clone, TypedBuilder)]
#[builder(doc)]
pub struct DialConfig {
    /// API key sent in the `Api-Key` header
    #[builder(setter(into))]
    pub api_key: String,
    /// Base URL of the gateway, without a trailing slash
    #[builder(
        setter(transform = |url: &str| url.trim_end_matches('/').to_string()),
        default = DEFAULT_DIAL_URL.to_string()
    )]
    pub base_url: String,
    /// Chat completions path template containing `{deployment}`
    #[builder(setter(into), default = DEFAULT_CHAT_COMPLETIONS_PATH.to_string())]
    pub chat_completions_path: String,
    /// Optional per-request timeout; none by default
    #[builder(default, setter(strip_option))]
    pub timeout: Option<Duration>,
    /// Directory generated images are saved into
    #[builder(setter(into), default = default_output_dir())]
    pub output_dir: PathBuf,
}

impl DialConfig {
    /// Creates a configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    ///
    /// # Environment Variables
    ///
    /// * `DIAL_API_KEY` - The API key for authentication (required)
    /// * `DIAL_URL` - Gateway base URL
    /// * `DIAL_CHAT_COMPLETIONS_PATH` - Endpoint path template with `{deployment}`
    /// * `DIAL_TIMEOUT_SECS` - Per-request timeout in seconds
    /// * `DIAL_OUTPUT_DIR` - Directory for generated images
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or a value cannot be parsed.
    pub fn from_env() -> Result<Self, DialError> {
        dotenv::dotenv().ok();

        let api_key = std::env::var("DIAL_API_KEY")?;
        if api_key.trim().is_empty() {
            return Err(DialError::Config("DIAL_API_KEY is empty".into()));
        }

        let base_url = std::env::var("DIAL_URL").unwrap_or_else(|_| DEFAULT_DIAL_URL.to_string());
        let chat_completions_path = std::env::var("DIAL_CHAT_COMPLETIONS_PATH")
            .unwrap_or_else(|_| DEFAULT_CHAT_COMPLETIONS_PATH.to_string());
        let output_dir = std::env::var("DIAL_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_output_dir());
        let timeout = match std::env::var("DIAL_TIMEOUT_SECS") {
            Ok(raw) => Some(parse_timeout(&raw)?),
            Err(_) => None,
        };

        let config = Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            chat_completions_path,
            timeout,
            output_dir,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the endpoint template can address a deployment.
    pub fn validate(&self) -> Result<(), DialError> {
        if !self.chat_completions_path.contains(DEPLOYMENT_PLACEHOLDER) {
            return Err(DialError::Config(format!(
                "chat completions path {:?} has no {} placeholder",
                self.chat_completions_path, DEPLOYMENT_PLACEHOLDER
            )));
        }
        url::Url::parse(&self.base_url).map_err(|e| {
            DialError::Config(format!("invalid base URL {:?}: {}", self.base_url, e))
        })?;
        Ok(())
    }

    /// Full chat completions URL for a deployment.
    pub fn chat_completions_url(&self, deployment: &str) -> String {
        format!(
            "{}{}",
            self.base_url,
            self.chat_completions_path
                .replace(DEPLOYMENT_PLACEHOLDER, deployment)
        )
    }

    /// Builds the HTTP client used by both gateway clients.
    pub(crate) fn http_client(&self) -> Result<reqwest::Client, DialError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| DialError::Config(format!("cannot build HTTP client: {}", e)))
    }
}

pub(crate) fn default_output_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(GENERATED_IMAGES_DIR)
}

fn parse_timeout(raw: &str) -> Result<Duration, DialError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| DialError::Config(format!("DIAL_TIMEOUT_SECS {:?}: {}", raw, e)))
}
