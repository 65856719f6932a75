//! The Sensu API client boundary.
//!
//! The provider consumes exactly two remote operations: fetch an asset by
//! name and upsert an asset. The upstream API has no create primitive
//! distinct from update, and no asset deletion at all, so the trait mirrors
//! that surface rather than inventing one.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::asset::Asset;
use crate::config::ProviderConfig;

/// Errors raised by the API client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The named asset does not exist upstream.
    #[error("asset {0} does not exist")]
    NotFound(String),
    /// The API answered with a non-success status.
    #[error("API returned status {status}: {message}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
        /// Response body, or the canonical reason when the body is empty.
        message: String,
    },
    /// The request could not be built for this endpoint.
    #[error("invalid API endpoint: {0}")]
    InvalidUrl(String),
    /// URL parse error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    /// Transport-level HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Synchronous request/response client surface consumed by the reconciler.
///
/// Both operations are single round trips. Retry policy, if any, belongs to
/// the transport behind an implementation, not to callers of this trait.
#[async_trait]
pub trait SensuClient: Send + Sync {
    /// Fetch an asset by name.
    async fn fetch_asset(&self, name: &str) -> Result<Asset, ClientError>;

    /// Create or update an asset. Idempotent upsert.
    async fn update_asset(&self, asset: &Asset) -> Result<(), ClientError>;
}

#[async_trait]
impl<C: SensuClient + ?Sized> SensuClient for std::sync::Arc<C> {
    async fn fetch_asset(&self, name: &str) -> Result<Asset, ClientError> {
        (**self).fetch_asset(name).await
    }

    async fn update_asset(&self, asset: &Asset) -> Result<(), ClientError> {
        (**self).update_asset(asset).await
    }
}

/// [`SensuClient`] implementation over the Sensu HTTP API.
pub struct HttpSensuClient {
    base: Url,
    api_key: Option<String>,
    inner: reqwest::Client,
}

impl HttpSensuClient {
    /// Build a client from the provider configuration.
    ///
    /// The request timeout comes from the configuration; everything else
    /// uses reqwest defaults.
    pub fn new(config: &ProviderConfig) -> Result<Self, ClientError> {
        let base = Url::parse(&config.api_url)?;
        let inner = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            base,
            api_key: config.api_key.clone(),
            inner,
        })
    }

    fn asset_url(&self, name: &str) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .push("assets")
            .push(name);
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let mut builder = self.inner.request(method, url);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }
}

async fn check_status(
    response: reqwest::Response,
    name: &str,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(name.to_string()));
    }
    let message = match response.text().await {
        Ok(body) if !body.trim().is_empty() => body.trim().to_string(),
        _ => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl SensuClient for HttpSensuClient {
    async fn fetch_asset(&self, name: &str) -> Result<Asset, ClientError> {
        let url = self.asset_url(name)?;
        debug!(asset = %name, url = %url, "fetching asset");
        let response = self.request(reqwest::Method::GET, url).send().await?;
        let response = check_status(response, name).await?;
        Ok(response.json().await?)
    }

    async fn update_asset(&self, asset: &Asset) -> Result<(), ClientError> {
        let url = self.asset_url(&asset.name)?;
        debug!(asset = %asset.name, url = %url, "upserting asset");
        let response = self
            .request(reqwest::Method::PUT, url)
            .json(asset)
            .send()
            .await?;
        check_status(response, &asset.name).await?;
        Ok(())
    }
}
