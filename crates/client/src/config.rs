//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MAILCOVE_API_BASE_URL` - Base URL of the backend API
//!   (e.g., `https://mail.example.com/api`)
//!
//! ## Optional
//! - `MAILCOVE_API_TIMEOUT_MS` - Per-request timeout in milliseconds
//!   (default: 10000)

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend API, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout. A request past this bound is aborted and
    /// surfaced as a timeout failure.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not a valid
    /// absolute URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: validate_base_url("base_url", base_url)?,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = std::env::var("MAILCOVE_API_BASE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("MAILCOVE_API_BASE_URL".to_string()))?;
        let base_url = validate_base_url("MAILCOVE_API_BASE_URL", &base_url)?;

        let timeout = match std::env::var("MAILCOVE_API_TIMEOUT_MS") {
            Ok(raw) => {
                let millis = raw.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar("MAILCOVE_API_TIMEOUT_MS".to_string(), e.to_string())
                })?;
                Duration::from_millis(millis)
            }
            Err(_) => DEFAULT_TIMEOUT,
        };

        Ok(Self { base_url, timeout })
    }

    /// Override the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Parse and normalize a base URL, stripping any trailing slash so route
/// paths can be appended verbatim.
fn validate_base_url(name: &str, raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            name.to_string(),
            format!("unsupported scheme: {}", url.scheme()),
        ));
    }
    Ok(raw.trim_end_matches('/').to_string())
}
