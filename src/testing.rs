//! Testing utilities for the provider.
//!
//! [`MemorySensuClient`] is an in-memory [`SensuClient`] double that keeps
//! assets in a map, counts remote calls (so tests can assert that an
//! operation made none), and can be primed to fail. [`ProviderTester`]
//! drives a [`SensuProvider`] without a host engine.
//!
//! # Example
//!
//! ```
//! use sensu_provider::testing::ProviderTester;
//! use sensu_provider::provider::ASSET_TYPE;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let (client, tester) = ProviderTester::in_memory();
//!
//! let state = tester
//!     .lifecycle_create(ASSET_TYPE, json!({
//!         "name": "example",
//!         "sha512": "abc123",
//!         "url": "http://example.com/asset/example.tar.gz"
//!     }))
//!     .await
//!     .unwrap();
//!
//! assert_eq!(state["id"], "example");
//! assert!(client.get("example").is_some());
//! # });
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::asset::Asset;
use crate::client::{ClientError, SensuClient};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::provider::SensuProvider;
use crate::schema::{Diagnostic, ProviderSchema};

/// In-memory [`SensuClient`] double.
#[derive(Default)]
pub struct MemorySensuClient {
    assets: Mutex<HashMap<String, Asset>>,
    fetch_calls: AtomicUsize,
    update_calls: AtomicUsize,
    fail_next: Mutex<Option<ClientError>>,
}

impl MemorySensuClient {
    /// Create an empty client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the remote store with an asset, bypassing the call counters.
    pub fn insert(&self, asset: Asset) {
        self.assets
            .lock()
            .unwrap()
            .insert(asset.name.clone(), asset);
    }

    /// Look at the stored asset, bypassing the call counters.
    pub fn get(&self, name: &str) -> Option<Asset> {
        self.assets.lock().unwrap().get(name).cloned()
    }

    /// Number of `fetch_asset` calls made so far.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of `update_asset` calls made so far.
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Make the next client call fail with the given error.
    pub fn fail_next(&self, error: ClientError) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    fn take_failure(&self) -> Option<ClientError> {
        self.fail_next.lock().unwrap().take()
    }
}

#[async_trait]
impl SensuClient for MemorySensuClient {
    async fn fetch_asset(&self, name: &str) -> Result<Asset, ClientError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.take_failure() {
            return Err(error);
        }
        self.get(name)
            .ok_or_else(|| ClientError::NotFound(name.to_string()))
    }

    async fn update_asset(&self, asset: &Asset) -> Result<(), ClientError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.take_failure() {
            return Err(error);
        }
        self.insert(asset.clone());
        Ok(())
    }
}

/// A harness driving a [`SensuProvider`] the way a host engine would.
pub struct ProviderTester<C> {
    provider: SensuProvider<C>,
}

impl ProviderTester<Arc<MemorySensuClient>> {
    /// Create a tester over an in-memory client with default configuration.
    ///
    /// Returns the client handle alongside the tester so tests can inspect
    /// the remote store and call counters.
    pub fn in_memory() -> (Arc<MemorySensuClient>, Self) {
        let client = Arc::new(MemorySensuClient::new());
        let provider =
            SensuProvider::with_client(ProviderConfig::default(), Arc::clone(&client));
        (client, Self::new(provider))
    }
}

impl<C: SensuClient> ProviderTester<C> {
    /// Create a tester for the given provider.
    pub fn new(provider: SensuProvider<C>) -> Self {
        Self { provider }
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &SensuProvider<C> {
        &self.provider
    }

    /// The provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Validate a resource configuration.
    pub fn validate_resource_config(
        &self,
        resource_type: &str,
        config: &Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        self.provider.validate_resource_config(resource_type, config)
    }

    /// Create a resource.
    pub async fn create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, config).await
    }

    /// Read a resource's current state.
    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    /// Update a resource.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .update(resource_type, prior_state, planned_state)
            .await
    }

    /// Delete a resource's local record.
    pub async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    /// Read a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, config)
            .await
    }

    /// Run a full create lifecycle: create, then read the state back.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let created_state = self.create(resource_type, config).await?;
        self.read(resource_type, created_state).await
    }

    /// Run a full update lifecycle: update, then read the state back.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let updated_state = self
            .update(resource_type, prior_state, planned_state)
            .await?;
        self.read(resource_type, updated_state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetSpec;
    use crate::provider::ASSET_TYPE;
    use serde_json::json;

    fn seeded_asset() -> Asset {
        AssetSpec::new(
            "example",
            "abc123",
            "http://example.com/asset/example.tar.gz",
        )
        .into_asset("default")
    }

    #[tokio::test]
    async fn test_memory_client_stores_and_counts() {
        let client = MemorySensuClient::new();

        let err = client.fetch_asset("example").await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));

        client.update_asset(&seeded_asset()).await.unwrap();
        let fetched = client.fetch_asset("example").await.unwrap();
        assert_eq!(fetched.sha512, "abc123");

        assert_eq!(client.fetch_calls(), 2);
        assert_eq!(client.update_calls(), 1);
    }

    #[tokio::test]
    async fn test_memory_client_fail_next_applies_once() {
        let client = MemorySensuClient::new();
        client.insert(seeded_asset());
        client.fail_next(ClientError::Api {
            status: 503,
            message: "unavailable".to_string(),
        });

        assert!(client.fetch_asset("example").await.is_err());
        assert!(client.fetch_asset("example").await.is_ok());
    }

    #[tokio::test]
    async fn test_lifecycle_create_and_update() {
        let (client, tester) = ProviderTester::in_memory();

        let state = tester
            .lifecycle_create(
                ASSET_TYPE,
                json!({
                    "name": "example",
                    "sha512": "abc123",
                    "url": "http://example.com/asset/example.tar.gz",
                    "metadata": {"header1": "test1", "header2": "test2"}
                }),
            )
            .await
            .unwrap();
        assert_eq!(state["id"], "example");
        assert_eq!(
            state["metadata"],
            json!({"header1": "test1", "header2": "test2"})
        );

        let mut planned = state.clone();
        planned["sha512"] = json!("def456");
        let updated = tester
            .lifecycle_update(ASSET_TYPE, state, planned)
            .await
            .unwrap();
        assert_eq!(updated["sha512"], "def456");
        assert_eq!(client.get("example").unwrap().sha512, "def456");
    }
}
