//! HTTP client for the Elgato light control API.

mod client;
mod error;
mod models;

use futures::future::BoxFuture;

pub use client::{DEFAULT_TIMEOUT, DeviceConfig, ElgatoClient};
pub use error::{DeviceError, DeviceResult};
pub use models::{AccessoryInfo, LightState, LightsEnvelope};

/// Access to a single light's state.
pub trait LightDevice: Send + Sync {
    /// Read the current state of the configured light.
    fn fetch_light_state(&self) -> BoxFuture<'static, DeviceResult<LightState>>;
    /// Write `state` back to the configured light.
    fn push_light_state(&self, state: LightState) -> BoxFuture<'static, DeviceResult<()>>;
}
