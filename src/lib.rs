//! Sensu Provider
//!
//! This crate manages **asset** objects in a Sensu monitoring cluster over
//! its HTTP API, translating between a declarative asset schema and the
//! remote REST resource.
//!
//! # Overview
//!
//! The crate provides:
//!
//! - **Asset types**: [`Asset`], [`AssetSpec`], and [`AssetChanges`]
//! - **AssetReconciler**: typed Create/Read/Update/Delete against the API
//! - **SensuClient trait**: the consumed API boundary (`fetch_asset` /
//!   `update_asset`), with [`HttpSensuClient`] as the HTTP implementation
//! - **SensuProvider**: the declarative facade a host diff/apply engine
//!   drives: schema, config validation, and JSON-valued CRUD
//! - **Error types**: [`ProviderError`] with local validation, not-found,
//!   and remote failure kinds
//! - **Logging**: integration with `tracing` for structured logging
//! - **Testing**: an in-memory client double and a provider harness
//!
//! # Quick Start
//!
//! ```no_run
//! use sensu_provider::{ProviderConfig, SensuProvider};
//! use sensu_provider::provider::ASSET_TYPE;
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProviderConfig::new("http://127.0.0.1:8080", "default");
//! let provider = SensuProvider::new(config)?;
//!
//! let state = provider
//!     .create(ASSET_TYPE, json!({
//!         "name": "example",
//!         "sha512": "abc123",
//!         "url": "http://example.com/asset/example.tar.gz",
//!     }))
//!     .await?;
//!
//! assert_eq!(state["id"], "example");
//! # Ok(())
//! # }
//! ```
//!
//! # Lifecycle
//!
//! Creation and update share a single idempotent upsert: the upstream API
//! has no create primitive distinct from update. There is no remote
//! deletion either: deleting an asset only removes the local declarative
//! record, and the remote object stays in place.
//!
//! Every operation is one synchronous round trip. Retries, batching, and
//! request sequencing all belong to the caller.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod asset;
pub mod client;
pub mod config;
pub mod error;
pub mod expand;
pub mod logging;
pub mod provider;
pub mod reconciler;
pub mod schema;
pub mod testing;
pub mod validation;

// Re-export main types at crate root
pub use asset::{Asset, AssetChanges, AssetSpec};
pub use client::{ClientError, HttpSensuClient, SensuClient};
pub use config::ProviderConfig;
pub use error::ProviderError;
pub use logging::{init_logging, try_init_logging};
pub use provider::SensuProvider;
pub use reconciler::AssetReconciler;
pub use schema::ProviderSchema;
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
