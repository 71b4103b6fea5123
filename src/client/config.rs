//! Client configuration for the storage HTTP API

use crate::error::{Result, StorageError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API address of a locally running storage daemon
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5001/api/v0/";

/// Environment variable overriding the API address
pub const ENV_API_URL: &str = "STORAGE_API_URL";

/// Environment variable overriding the default request timeout, in seconds
pub const ENV_API_TIMEOUT: &str = "STORAGE_API_TIMEOUT";

/// Configuration for a storage client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base address of the HTTP API, resources are resolved relative to it
    #[serde(rename = "base-url")]
    pub base_url: String,
    /// Default request timeout in seconds, overridable per call (default: none)
    #[serde(rename = "timeout", skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// User agent sent with every request
    #[serde(rename = "user-agent", skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: None,
            user_agent: Some(concat!("storage-http-client/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from `STORAGE_API_URL` and `STORAGE_API_TIMEOUT`,
    /// falling back to defaults for unset variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var(ENV_API_URL) {
            config = config.base_url(url);
        }

        if let Ok(timeout) = std::env::var(ENV_API_TIMEOUT) {
            let secs = timeout.trim().parse::<u64>().map_err(|_| {
                StorageError::config_error(format!(
                    "{} must be a whole number of seconds, got {:?}",
                    ENV_API_TIMEOUT, timeout
                ))
            })?;
            config = config.timeout_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the API base address
    pub fn base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the default request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Set the user agent
    pub fn user_agent<S: Into<String>>(mut self, agent: S) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// The base address with a guaranteed trailing slash, so that
    /// joining `add` keeps the API prefix
    pub fn normalized_base_url(&self) -> String {
        let trimmed = self.base_url.trim();
        if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{}/", trimmed)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(StorageError::invalid_parameter(
                "base_url",
                "Base URL cannot be empty",
            ));
        }

        let url = reqwest::Url::parse(&self.normalized_base_url()).map_err(|e| {
            StorageError::invalid_parameter("base_url", format!("{}: {}", self.base_url, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(StorageError::invalid_parameter(
                "base_url",
                format!("Unsupported scheme: {}", url.scheme()),
            ));
        }

        if self.timeout_secs == Some(0) {
            return Err(StorageError::invalid_parameter(
                "timeout",
                "Timeout must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Convert the configuration to a JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(StorageError::from)
    }

    /// Create a configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(StorageError::from)
    }
}
