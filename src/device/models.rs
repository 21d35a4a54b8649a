//! JSON payloads exchanged with the light.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `GET`/`PUT /elgato/lights`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightsEnvelope {
    /// Number of lights, only present in responses.
    #[serde(
        rename = "numberOfLights",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub number_of_lights: Option<u32>,
    /// One entry per light.
    pub lights: Vec<LightState>,
}

impl LightsEnvelope {
    /// Envelope carrying a single light update.
    pub fn single(state: LightState) -> Self {
        Self {
            number_of_lights: None,
            lights: vec![state],
        }
    }
}

/// State of one light. Only `hue` is ever rewritten; everything else round-trips untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightState {
    /// Power flag (`1` on, `0` off).
    pub on: u8,
    /// Hue in degrees.
    pub hue: f64,
    /// Saturation in percent.
    pub saturation: f64,
    /// Brightness in percent.
    pub brightness: u8,
    /// Fields this tool does not model, passed back as received.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LightState {
    /// Current hue mapped onto the integer range `0..=359`.
    pub fn device_hue(&self) -> u16 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rounded = self.hue.round().rem_euclid(360.0) as u16;
        rounded % 360
    }
}

/// Body of `GET /elgato/accessory-info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessoryInfo {
    /// Product line, e.g. "Elgato Light Strip".
    pub product_name: String,
    /// User facing name of this unit.
    pub display_name: String,
    /// Firmware version string.
    pub firmware_version: String,
    /// Hardware serial number.
    pub serial_number: String,
}
