//! Error types for the Sensu provider.

use thiserror::Error;

use crate::client::ClientError;

/// Errors that can occur when managing Sensu resources.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested asset does not exist upstream.
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// A validation error occurred. Raised locally, before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A remote call failed. Carries the name of the failed operation and
    /// the underlying transport or server error.
    #[error("Error {operation}: {source}")]
    Remote {
        /// The operation that failed, e.g. `"creating asset example"`.
        operation: String,
        /// The underlying client error.
        #[source]
        source: ClientError,
    },

    /// The provider configuration is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource or data source type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProviderError {
    /// Wrap a client error from the named operation.
    ///
    /// A remote "not found" is surfaced as [`ProviderError::NotFound`] so
    /// callers can distinguish an absent object from a failed call; every
    /// other client error becomes [`ProviderError::Remote`].
    pub fn remote(operation: impl Into<String>, source: ClientError) -> Self {
        match source {
            ClientError::NotFound(name) => Self::NotFound(name),
            source => Self::Remote {
                operation: operation.into(),
                source,
            },
        }
    }

    /// Build a validation error for a missing required field.
    pub fn missing_field(field: &str) -> Self {
        Self::Validation(format!("{} must not be empty", field))
    }

    /// Whether this error was raised before any network call was made.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Configuration(_)
                | Self::UnknownResource(_)
                | Self::Serialization(_)
        )
    }
}
