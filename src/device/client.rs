use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{
    LightDevice,
    error::{DeviceError, DeviceResult},
    models::{AccessoryInfo, LightState, LightsEnvelope},
};

/// Timeout applied to every request when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const LIGHTS_PATH: &str = "elgato/lights";
const ACCESSORY_INFO_PATH: &str = "elgato/accessory-info";

/// Runtime configuration describing how to reach the light.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Base URL of the light, e.g. `http://192.168.178.64:9123`.
    pub base_url: String,
    /// Index of the light inside the `lights` array.
    pub light_index: usize,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl DeviceConfig {
    /// Construct a configuration for the first light with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            light_index: 0,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Target another light of the accessory.
    pub fn with_light_index(mut self, light_index: usize) -> Self {
        self.light_index = light_index;
        self
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// `reqwest` backed client for one light of an Elgato accessory.
#[derive(Debug, Clone)]
pub struct ElgatoClient {
    client: Client,
    base_url: Arc<str>,
    light_index: usize,
}

impl ElgatoClient {
    /// Build the HTTP client. No request is sent until the first fetch.
    pub fn new(config: DeviceConfig) -> DeviceResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| DeviceError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            light_index: config.light_index,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Read the accessory description (product, firmware, serial number).
    pub async fn fetch_accessory_info(&self) -> DeviceResult<AccessoryInfo> {
        get_json(&self.client, self.url(ACCESSORY_INFO_PATH)).await
    }

    /// Read the state of the configured light.
    pub async fn fetch_light_state(&self) -> DeviceResult<LightState> {
        let mut envelope: LightsEnvelope = get_json(&self.client, self.url(LIGHTS_PATH)).await?;
        let count = envelope.lights.len();
        if self.light_index >= count {
            return Err(DeviceError::MissingLight {
                index: self.light_index,
                count,
            });
        }
        Ok(envelope.lights.swap_remove(self.light_index))
    }

    /// Write `state` back to the light.
    pub async fn push_light_state(&self, state: LightState) -> DeviceResult<()> {
        let url = self.url(LIGHTS_PATH);
        let response = self
            .client
            .put(&url)
            .json(&LightsEnvelope::single(state))
            .send()
            .await
            .map_err(|source| DeviceError::RequestSend {
                url: url.clone(),
                source,
            })?;

        match response.status() {
            status if status.is_success() => {
                debug!(%url, %status, "light state pushed");
                Ok(())
            }
            other => Err(DeviceError::RequestStatus { url, status: other }),
        }
    }
}

impl LightDevice for ElgatoClient {
    fn fetch_light_state(&self) -> BoxFuture<'static, DeviceResult<LightState>> {
        let client = self.clone();
        Box::pin(async move { ElgatoClient::fetch_light_state(&client).await })
    }

    fn push_light_state(&self, state: LightState) -> BoxFuture<'static, DeviceResult<()>> {
        let client = self.clone();
        Box::pin(async move { ElgatoClient::push_light_state(&client, state).await })
    }
}

async fn get_json<T>(client: &Client, url: String) -> DeviceResult<T>
where
    T: DeserializeOwned,
{
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|source| DeviceError::RequestSend {
            url: url.clone(),
            source,
        })?;

    match response.status() {
        status if status.is_success() => response
            .json::<T>()
            .await
            .map_err(|source| DeviceError::DecodeResponse { url, source }),
        other => Err(DeviceError::RequestStatus { url, status: other }),
    }
}
