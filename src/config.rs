//! Provider-level configuration.
//!
//! One [`ProviderConfig`] is built at startup, validated once, and treated
//! as read-only afterwards. The reconciler and client are constructed from
//! it explicitly; no operation recovers configuration from ambient context.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ProviderError;

fn default_api_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_organization() -> String {
    "default".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    30
}

/// Configuration shared by every operation of the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the Sensu API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Organization every managed asset is registered under.
    #[serde(default = "default_organization")]
    pub organization: String,
    /// Bearer token sent with every API request, if the cluster requires
    /// authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Per-request timeout applied by the HTTP client.
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            organization: default_organization(),
            api_key: None,
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl ProviderConfig {
    /// Create a configuration for the given API endpoint and organization.
    pub fn new(api_url: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            organization: organization.into(),
            ..Default::default()
        }
    }

    /// Set the bearer token used for API authentication.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the per-request timeout in seconds.
    pub fn with_request_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_seconds = seconds;
        self
    }

    /// The per-request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Check that the configuration can actually reach an API.
    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.api_url.is_empty() {
            return Err(ProviderError::Configuration(
                "api_url must not be empty".to_string(),
            ));
        }
        let parsed = Url::parse(&self.api_url)
            .map_err(|e| ProviderError::Configuration(format!("invalid api_url: {}", e)))?;
        if parsed.host_str().is_none() {
            return Err(ProviderError::Configuration(
                "api_url has no host".to_string(),
            ));
        }
        if self.organization.is_empty() {
            return Err(ProviderError::Configuration(
                "organization must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
