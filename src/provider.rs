//! The provider facade.
//!
//! [`SensuProvider`] exposes the declarative surface a host diff/apply
//! engine drives: schema description, config validation, and JSON-valued
//! CRUD plus data-source reads, all dispatched through the
//! [`AssetReconciler`].

use serde_json::Value;
use tracing::debug;

use crate::asset::AssetChanges;
use crate::client::{HttpSensuClient, SensuClient};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::expand;
use crate::reconciler::AssetReconciler;
use crate::schema::{Attribute, Diagnostic, ProviderSchema, Schema};
use crate::validation;

/// Type name of the asset resource and data source.
pub const ASSET_TYPE: &str = "sensu_asset";

/// Provider for Sensu resources.
pub struct SensuProvider<C> {
    config: ProviderConfig,
    reconciler: AssetReconciler<C>,
}

impl SensuProvider<HttpSensuClient> {
    /// Build a provider talking to the configured Sensu API.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        config.validate()?;
        let client = HttpSensuClient::new(&config)
            .map_err(|e| ProviderError::Configuration(format!("cannot build API client: {}", e)))?;
        Ok(Self::with_client(config, client))
    }
}

impl<C: SensuClient> SensuProvider<C> {
    /// Build a provider around an existing client. Used by tests and by
    /// callers that construct their own transport.
    pub fn with_client(config: ProviderConfig, client: C) -> Self {
        let reconciler = AssetReconciler::new(client, config.organization.clone());
        Self { config, reconciler }
    }

    /// The provider configuration.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// The underlying reconciler, for callers that prefer the typed API.
    pub fn reconciler(&self) -> &AssetReconciler<C> {
        &self.reconciler
    }

    /// The provider's declarative surface.
    pub fn schema(&self) -> ProviderSchema {
        ProviderSchema::new()
            .with_provider_config(provider_config_schema())
            .with_resource(ASSET_TYPE, asset_resource_schema())
            .with_data_source(ASSET_TYPE, asset_data_source_schema())
    }

    /// Validate a resource configuration against its schema.
    pub fn validate_resource_config(
        &self,
        resource_type: &str,
        config: &Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        check_type(resource_type)?;
        Ok(validation::validate(&asset_resource_schema(), config))
    }

    /// Validate a data source configuration against its schema.
    pub fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: &Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        check_type(data_source_type)?;
        Ok(validation::validate(&asset_data_source_schema(), config))
    }

    /// Create an asset from its declared configuration.
    ///
    /// Returns the state read back from the API, with the asset name as the
    /// resource id.
    pub async fn create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        check_type(resource_type)?;
        ensure_valid(&asset_resource_schema(), &config)?;

        let spec = expand::asset_spec_from_config(&config)?;
        let asset = self.reconciler.create(spec).await?;
        Ok(expand::asset_to_state(&asset))
    }

    /// Refresh the state of an asset from the API.
    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        check_type(resource_type)?;
        let name = state_id(&current_state)?;
        let asset = self.reconciler.read(&name).await?;
        Ok(expand::asset_to_state(&asset))
    }

    /// Apply the difference between the prior and planned states.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        check_type(resource_type)?;
        ensure_valid(&asset_resource_schema(), &planned_state)?;

        let name = state_id(&prior_state)?;
        let prior = expand::asset_spec_from_config(&prior_state)?;
        let planned = expand::asset_spec_from_config(&planned_state)?;

        let mut changes = AssetChanges::new();
        if planned.sha512 != prior.sha512 {
            changes.sha512 = Some(planned.sha512);
        }
        if planned.url != prior.url {
            changes.url = Some(planned.url);
        }
        if planned.filters != prior.filters {
            changes.filters = Some(planned.filters);
        }
        if planned.metadata != prior.metadata {
            changes.metadata = Some(planned.metadata);
        }

        if changes.is_empty() {
            debug!(asset = %name, "no changes to apply");
        }

        let asset = self.reconciler.update(&name, changes).await?;
        Ok(expand::asset_to_state(&asset))
    }

    /// Drop the local record of an asset. Never touches the remote object.
    pub async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        check_type(resource_type)?;
        let name = state_id(&current_state)?;
        self.reconciler.delete(&name).await
    }

    /// Look up an asset by name.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        check_type(data_source_type)?;
        ensure_valid(&asset_data_source_schema(), &config)?;

        let name = expand::string_field(&config, "name")?;
        let asset = self.reconciler.read(&name).await?;
        Ok(expand::asset_to_state(&asset))
    }
}

fn check_type(type_name: &str) -> Result<(), ProviderError> {
    if type_name == ASSET_TYPE {
        Ok(())
    } else {
        Err(ProviderError::UnknownResource(type_name.to_string()))
    }
}

fn ensure_valid(schema: &Schema, config: &Value) -> Result<(), ProviderError> {
    validation::validate_result(schema, config).map_err(|diagnostics| {
        let summary = diagnostics
            .iter()
            .map(|d| d.summary.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        ProviderError::Validation(summary)
    })
}

/// The resource id is the asset name; older states may only carry `name`.
fn state_id(state: &Value) -> Result<String, ProviderError> {
    if let Some(id) = expand::optional_string_field(state, "id")? {
        return Ok(id);
    }
    expand::string_field(state, "name")
}

fn asset_resource_schema() -> Schema {
    Schema::v0()
        .with_attribute("id", Attribute::computed_string())
        .with_attribute(
            "name",
            Attribute::required_string()
                .with_description("Unique asset name within the organization")
                .with_force_new(),
        )
        .with_attribute("sha512", Attribute::required_string())
        .with_attribute("url", Attribute::required_string())
        .with_attribute("filters", Attribute::optional_string_list())
        .with_attribute("metadata", Attribute::optional_string_map())
}

fn asset_data_source_schema() -> Schema {
    Schema::v0()
        .with_attribute("id", Attribute::computed_string())
        .with_attribute("name", Attribute::required_string())
        .with_attribute("sha512", Attribute::computed_string())
        .with_attribute("url", Attribute::computed_string())
        .with_attribute("filters", Attribute::computed_string_list())
        .with_attribute("metadata", Attribute::computed_string_map())
}

fn provider_config_schema() -> Schema {
    Schema::v0()
        .with_attribute(
            "api_url",
            Attribute::optional_string().with_description("Base URL of the Sensu API"),
        )
        .with_attribute("organization", Attribute::optional_string())
        .with_attribute("api_key", Attribute::optional_string().sensitive())
        .with_attribute("request_timeout_seconds", Attribute::optional_int64())
}
