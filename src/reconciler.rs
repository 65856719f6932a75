//! The asset reconciler.
//!
//! Translates between declared asset records and the remote API. Every
//! operation is a single awaited round trip with no retries, batching, or
//! overlapping requests; sequencing is the caller's responsibility.

use tracing::{debug, info, warn};

use crate::asset::{Asset, AssetChanges, AssetSpec};
use crate::client::SensuClient;
use crate::error::ProviderError;

/// Reconciles declared assets against a Sensu cluster.
///
/// Constructed once with the client handle and the organization and passed
/// around explicitly; operations never recover configuration from ambient
/// context.
pub struct AssetReconciler<C> {
    client: C,
    organization: String,
}

impl<C: SensuClient> AssetReconciler<C> {
    /// Create a reconciler for the given client and organization.
    pub fn new(client: C, organization: impl Into<String>) -> Self {
        Self {
            client,
            organization: organization.into(),
        }
    }

    /// The organization every managed asset is registered under.
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Create an asset from the desired record.
    ///
    /// The organization is stamped from the provider configuration, the
    /// asset is validated locally, then upserted. The upstream API has no
    /// create primitive distinct from update, so creation reuses the upsert.
    /// On success the remote state is read back so the caller sees the
    /// authoritative values.
    pub async fn create(&self, desired: AssetSpec) -> Result<Asset, ProviderError> {
        let asset = desired.into_asset(self.organization.as_str());
        asset.validate()?;

        debug!(asset = %asset.name, organization = %self.organization, "creating asset");
        self.client
            .update_asset(&asset)
            .await
            .map_err(|e| ProviderError::remote(format!("creating asset {}", asset.name), e))?;

        info!(asset = %asset.name, "asset created");
        self.read(&asset.name).await
    }

    /// Fetch the authoritative remote state of an asset.
    ///
    /// Fails with [`ProviderError::NotFound`] when the asset is absent and
    /// [`ProviderError::Remote`] on transport or server failure.
    pub async fn read(&self, name: &str) -> Result<Asset, ProviderError> {
        let asset = self
            .client
            .fetch_asset(name)
            .await
            .map_err(|e| ProviderError::remote(format!("retrieving asset {}", name), e))?;

        debug!(asset = %name, "retrieved asset");
        Ok(asset)
    }

    /// Apply a change-set to an existing asset.
    ///
    /// The change-set is validated locally, then the current remote state is
    /// fetched, the changed fields are applied on top of it, and the result
    /// is re-validated and upserted. Reads back the remote state on success.
    ///
    /// In-place filter changes are not applied: the upstream update path for
    /// filters is broken, so the remote value always wins. A requested
    /// filter change is dropped with a warning.
    pub async fn update(&self, name: &str, changes: AssetChanges) -> Result<Asset, ProviderError> {
        validate_changes(name, &changes)?;

        let mut asset = self
            .client
            .fetch_asset(name)
            .await
            .map_err(|e| ProviderError::remote(format!("retrieving asset {}", name), e))?;

        if let Some(sha512) = changes.sha512 {
            asset.sha512 = sha512;
        }
        if let Some(url) = changes.url {
            asset.url = url;
        }
        if changes.filters.is_some() {
            warn!(asset = %name, "filters cannot be updated in place; keeping remote value");
        }
        if let Some(metadata) = changes.metadata {
            asset.metadata = metadata;
        }

        asset.validate()?;

        debug!(asset = %name, "updating asset");
        self.client
            .update_asset(&asset)
            .await
            .map_err(|e| ProviderError::remote(format!("updating asset {}", name), e))?;

        info!(asset = %name, "asset updated");
        self.read(name).await
    }

    /// Remove the local record of an asset.
    ///
    /// The upstream API offers no asset deletion, so this never issues a
    /// remote call; the remote object outlives the declarative record.
    pub async fn delete(&self, name: &str) -> Result<(), ProviderError> {
        info!(asset = %name, "removing local asset record; remote asset is left in place");
        Ok(())
    }
}

/// Reject a change-set that could only produce an invalid asset, before any
/// network round trip happens.
fn validate_changes(name: &str, changes: &AssetChanges) -> Result<(), ProviderError> {
    if name.is_empty() {
        return Err(ProviderError::missing_field("name"));
    }
    if matches!(changes.sha512.as_deref(), Some("")) {
        return Err(ProviderError::missing_field("sha512"));
    }
    if matches!(changes.url.as_deref(), Some("")) {
        return Err(ProviderError::missing_field("url"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemorySensuClient;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn spec() -> AssetSpec {
        AssetSpec::new(
            "example",
            "abc123",
            "http://example.com/asset/example.tar.gz",
        )
    }

    fn reconciler() -> (Arc<MemorySensuClient>, AssetReconciler<Arc<MemorySensuClient>>) {
        let client = Arc::new(MemorySensuClient::new());
        let reconciler = AssetReconciler::new(Arc::clone(&client), "default");
        (client, reconciler)
    }

    #[tokio::test]
    async fn test_create_stamps_organization_and_reads_back() {
        let (client, reconciler) = reconciler();

        let asset = reconciler.create(spec()).await.unwrap();
        assert_eq!(asset.name, "example");
        assert_eq!(asset.sha512, "abc123");
        assert_eq!(asset.url, "http://example.com/asset/example.tar.gz");
        assert_eq!(asset.organization, "default");

        // Read-after-write: one upsert, one fetch.
        assert_eq!(client.update_calls(), 1);
        assert_eq!(client.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_create_invalid_asset_issues_no_remote_call() {
        let (client, reconciler) = reconciler();

        for broken in [
            AssetSpec::new("", "abc123", "http://example.com/a.tar.gz"),
            AssetSpec::new("example", "", "http://example.com/a.tar.gz"),
            AssetSpec::new("example", "abc123", ""),
        ] {
            let err = reconciler.create(broken).await.unwrap_err();
            assert!(matches!(err, ProviderError::Validation(_)));
        }

        assert_eq!(client.update_calls(), 0);
        assert_eq!(client.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_create_then_read_returns_supplied_values() {
        let (_client, reconciler) = reconciler();

        let metadata = HashMap::from([
            ("header1".to_string(), "test1".to_string()),
            ("header2".to_string(), "test2".to_string()),
        ]);
        reconciler
            .create(spec().with_metadata(metadata.clone()))
            .await
            .unwrap();

        let read = reconciler.read("example").await.unwrap();
        assert_eq!(read.sha512, "abc123");
        assert_eq!(read.url, "http://example.com/asset/example.tar.gz");
        assert_eq!(read.metadata, metadata);
    }

    #[tokio::test]
    async fn test_read_missing_asset_is_not_found() {
        let (_client, reconciler) = reconciler();

        let err = reconciler.read("missing").await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(name) if name == "missing"));
    }

    #[tokio::test]
    async fn test_update_metadata_only_leaves_other_fields() {
        let (client, reconciler) = reconciler();
        reconciler
            .create(spec().with_filters(vec!["system.os == 'linux'".to_string()]))
            .await
            .unwrap();

        let metadata = HashMap::from([("header1".to_string(), "test1".to_string())]);
        reconciler
            .update("example", AssetChanges::new().metadata(metadata.clone()))
            .await
            .unwrap();

        let remote = client.get("example").unwrap();
        assert_eq!(remote.sha512, "abc123");
        assert_eq!(remote.url, "http://example.com/asset/example.tar.gz");
        assert_eq!(remote.filters, vec!["system.os == 'linux'".to_string()]);
        assert_eq!(remote.metadata, metadata);
    }

    #[tokio::test]
    async fn test_update_drops_filter_changes() {
        let (client, reconciler) = reconciler();
        reconciler
            .create(spec().with_filters(vec!["system.os == 'linux'".to_string()]))
            .await
            .unwrap();

        reconciler
            .update(
                "example",
                AssetChanges::new()
                    .sha512("def456")
                    .filters(vec!["system.os == 'darwin'".to_string()]),
            )
            .await
            .unwrap();

        let remote = client.get("example").unwrap();
        assert_eq!(remote.sha512, "def456");
        assert_eq!(remote.filters, vec!["system.os == 'linux'".to_string()]);
    }

    #[tokio::test]
    async fn test_update_invalid_changes_issue_no_remote_call() {
        let (client, reconciler) = reconciler();

        let err = reconciler
            .update("example", AssetChanges::new().sha512(""))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));

        let err = reconciler
            .update("", AssetChanges::new().sha512("def456"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));

        assert_eq!(client.fetch_calls(), 0);
        assert_eq!(client.update_calls(), 0);
    }

    #[tokio::test]
    async fn test_update_missing_asset_is_not_found() {
        let (_client, reconciler) = reconciler();

        let err = reconciler
            .update("missing", AssetChanges::new().sha512("def456"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_never_issues_remote_call() {
        let (client, reconciler) = reconciler();
        reconciler.create(spec()).await.unwrap();
        let fetches = client.fetch_calls();
        let updates = client.update_calls();

        reconciler.delete("example").await.unwrap();
        // Deleting something that never existed is also local-only.
        reconciler.delete("missing").await.unwrap();

        assert_eq!(client.fetch_calls(), fetches);
        assert_eq!(client.update_calls(), updates);
        // The remote object is untouched.
        assert!(client.get("example").is_some());
    }

    #[tokio::test]
    async fn test_remote_failure_carries_operation_name() {
        let (client, reconciler) = reconciler();
        client.fail_next(crate::client::ClientError::Api {
            status: 500,
            message: "internal error".to_string(),
        });

        let err = reconciler.create(spec()).await.unwrap_err();
        match err {
            ProviderError::Remote { operation, .. } => {
                assert_eq!(operation, "creating asset example");
            }
            other => panic!("expected Remote error, got {:?}", other),
        }
    }
}
