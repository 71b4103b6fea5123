//! Storage service client
//!
//! A [`StorageClient`] is a read-only capability: it holds the HTTP
//! connection pool and the resolved API address, and is cheap to clone.
//! Every operation takes it by shared reference.

pub mod config;

pub use config::ClientConfig;

use crate::error::{Result, StorageError};
use reqwest::Url;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    base_url: Url,
    config: ClientConfig,
}

impl StorageClient {
    /// Create a client from a configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.normalized_base_url()).map_err(|e| {
            StorageError::config_error(format!("invalid API URL {}: {}", config.base_url, e))
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        log::debug!("Created storage client for {}", base_url);

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    /// Create a client for the given API address with default settings
    pub fn from_url(base_url: &str) -> Result<Self> {
        Self::new(ClientConfig::new().base_url(base_url))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn default_timeout(&self) -> Option<Duration> {
        self.config.timeout()
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Resolve an API resource such as `add` against the base address
    pub(crate) fn endpoint(&self, resource: &str) -> Result<Url> {
        self.base_url.join(resource).map_err(|e| {
            StorageError::config_error(format!("failed to build URL for {}: {}", resource, e))
        })
    }
}
