//! The asset domain types.
//!
//! An asset is a downloadable bundle (plugin or library) that Sensu agents
//! fetch and install, identified by name and validated by checksum. Assets
//! are registered under an organization; the organization is inherited from
//! the provider configuration and is never user-settable per asset.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// A Sensu asset as stored by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique name within the organization. Immutable after creation and
    /// used as the resource's external id.
    pub name: String,
    /// SHA-512 checksum of the asset bundle.
    pub sha512: String,
    /// Source location of the asset bundle.
    pub url: String,
    /// Expressions restricting which agents install the asset. Ordered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<String>,
    /// Free-form string key/value annotations.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    /// Tenancy scope the asset is registered under.
    pub organization: String,
}

impl Asset {
    /// Check the invariants the API enforces before accepting an asset.
    ///
    /// `name`, `sha512` and `url` must be non-empty. Called before any
    /// network round trip so an invalid asset never leaves the process.
    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.name.is_empty() {
            return Err(ProviderError::missing_field("name"));
        }
        if self.sha512.is_empty() {
            return Err(ProviderError::missing_field("sha512"));
        }
        if self.url.is_empty() {
            return Err(ProviderError::missing_field("url"));
        }
        Ok(())
    }
}

/// A desired asset as declared by the user, before the provider stamps the
/// organization onto it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssetSpec {
    /// Unique name within the organization.
    pub name: String,
    /// SHA-512 checksum of the asset bundle.
    pub sha512: String,
    /// Source location of the asset bundle.
    pub url: String,
    /// Expressions restricting which agents install the asset.
    #[serde(default)]
    pub filters: Vec<String>,
    /// Free-form string key/value annotations.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl AssetSpec {
    /// Create a spec with the three required fields.
    pub fn new(
        name: impl Into<String>,
        sha512: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            sha512: sha512.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the install filters.
    pub fn with_filters(mut self, filters: Vec<String>) -> Self {
        self.filters = filters;
        self
    }

    /// Set the metadata mapping.
    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Turn the spec into an [`Asset`] registered under `organization`.
    pub fn into_asset(self, organization: impl Into<String>) -> Asset {
        Asset {
            name: self.name,
            sha512: self.sha512,
            url: self.url,
            filters: self.filters,
            metadata: self.metadata,
            organization: organization.into(),
        }
    }
}

/// A change-set for an existing asset.
///
/// Only fields that are `Some` are applied; the rest keep their remote
/// values. The asset name is immutable and therefore absent here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetChanges {
    /// New checksum, if it changed.
    pub sha512: Option<String>,
    /// New source location, if it changed.
    pub url: Option<String>,
    /// New install filters, if they changed. Not applied in place; see
    /// [`AssetReconciler::update`](crate::reconciler::AssetReconciler::update).
    pub filters: Option<Vec<String>>,
    /// New metadata mapping, if it changed. Replaces the whole mapping.
    pub metadata: Option<HashMap<String, String>>,
}

impl AssetChanges {
    /// Create an empty change-set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the checksum.
    pub fn sha512(mut self, sha512: impl Into<String>) -> Self {
        self.sha512 = Some(sha512.into());
        self
    }

    /// Change the source location.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Change the install filters.
    pub fn filters(mut self, filters: Vec<String>) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Replace the metadata mapping.
    pub fn metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Whether the change-set carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.sha512.is_none()
            && self.url.is_none()
            && self.filters.is_none()
            && self.metadata.is_none()
    }
}
