//! Provider adapter layer
//!
//! Every upstream service gets its own response types and an explicit
//! [`Normalize`] implementation into the internal shapes in [`crate::models`].
//! All HTTP goes through the [`Transport`] seam so adapters can be exercised
//! without a network.

pub mod air_quality;
pub mod climate;
pub mod geocoding;
pub mod pollen;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::ProvidersConfig;
use crate::{BreezeError, Result};

pub use air_quality::{AirQualityClient, CurrentConditions};
pub use climate::ClimateClient;
pub use geocoding::{GeocodingClient, Suggestion};
pub use pollen::{GooglePollenClient, OpenMeteoPollenClient, PollenService, PrimaryPollenEndpoint};

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal GET-only HTTP seam shared by all adapters and the relay
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a GET. Non-2xx statuses are returned, not turned into errors.
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// Production transport backed by `reqwest`
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &ProvidersConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("Breeze/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

/// A provider payload with an explicit conversion into internal types
pub trait Normalize: DeserializeOwned {
    type Context;
    type Output;

    fn normalize(self, context: &Self::Context) -> Result<Self::Output>;
}

/// GET `url` and decode a 2xx JSON body into `T`.
///
/// `provider` only labels log lines and errors; URLs may carry keys and are
/// never logged by this function.
pub async fn fetch_json<T: DeserializeOwned>(
    transport: &dyn Transport,
    provider: &'static str,
    url: &str,
) -> Result<T> {
    let start_time = Instant::now();
    let response = transport.get(url).await.map_err(|e| {
        warn!("{} request failed: {}", provider, e);
        e
    })?;

    let duration = start_time.elapsed();
    debug!(
        "{} responded {} in {:.3}s",
        provider,
        response.status,
        duration.as_secs_f64()
    );
    if duration.as_secs() > 5 {
        warn!(
            "Slow {} response detected: {:.3}s",
            provider,
            duration.as_secs_f64()
        );
    }

    if !response.is_success() {
        return Err(BreezeError::http_status(
            format!("{provider} returned HTTP {}", response.status),
            response.status,
        ));
    }

    serde_json::from_str(&response.body)
        .map_err(|e| BreezeError::malformed(format!("{provider} sent an unreadable body: {e}")))
}

/// Fetch and normalize in one step
pub async fn fetch_normalized<T: Normalize>(
    transport: &dyn Transport,
    provider: &'static str,
    url: &str,
    context: &T::Context,
) -> Result<T::Output> {
    let payload: T = fetch_json(transport, provider, url).await?;
    payload.normalize(context)
}
