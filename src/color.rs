//! Color model backed by `palette`: parsing of `"R,G,B"` strings, hue extraction and
//! straight-line interpolation in sRGB space.

use std::{fmt, str::FromStr};

use palette::{FromColor, Hsl, Mix, Srgb};
use thiserror::Error;

/// Failures raised while building a [`Color`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// The source text is not three comma separated integers in `0..=255`.
    #[error("invalid color `{input}`: {reason}")]
    InvalidInput {
        /// Offending source text.
        input: String,
        /// Human readable reason.
        reason: &'static str,
    },
}

/// Immutable color stored as normalized sRGB components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    rgb: Srgb,
}

impl Color {
    /// Build a color from 8-bit channel values.
    pub fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            rgb: Srgb::new(red, green, blue).into_format(),
        }
    }

    /// Build a color from integer channels, rejecting anything outside `0..=255`.
    pub fn from_channels(red: i64, green: i64, blue: i64) -> Result<Self, ColorError> {
        let channel = |value: i64| {
            u8::try_from(value).map_err(|_| ColorError::InvalidInput {
                input: format!("{red},{green},{blue}"),
                reason: "channel outside 0..=255",
            })
        };
        Ok(Self::from_rgb8(channel(red)?, channel(green)?, channel(blue)?))
    }

    /// Normalized `(red, green, blue)` components in `[0, 1]`.
    pub fn components(&self) -> (f32, f32, f32) {
        self.rgb.into_components()
    }

    /// Hue in degrees within `[0, 360)`, using the RGB to HSL conversion.
    ///
    /// Achromatic colors (greys, black, white) report a hue of `0`.
    pub fn hue(&self) -> f32 {
        let hsl: Hsl = Hsl::from_color(self.rgb);
        let degrees = hsl.hue.into_positive_degrees();
        if degrees >= 360.0 { 0.0 } else { degrees }
    }

    /// Hue rounded onto the device's integer range `0..=359`.
    pub fn device_hue(&self) -> u16 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rounded = self.hue().round() as u16;
        rounded % 360
    }

    /// Return `steps` evenly spaced colors from `self` to `end`, both endpoints included.
    ///
    /// Fewer than two steps cannot hold both endpoints; `0` yields nothing and `1`
    /// yields only `self`.
    pub fn interpolate(&self, end: &Color, steps: usize) -> Vec<Color> {
        match steps {
            0 => Vec::new(),
            1 => vec![*self],
            _ => {
                #[allow(clippy::cast_precision_loss)]
                let last = (steps - 1) as f32;
                (0..steps)
                    .map(|i| {
                        if i == 0 {
                            *self
                        } else if i == steps - 1 {
                            *end
                        } else {
                            #[allow(clippy::cast_precision_loss)]
                            let factor = i as f32 / last;
                            Self {
                                rgb: self.rgb.mix(end.rgb, factor),
                            }
                        }
                    })
                    .collect()
            }
        }
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ColorError::InvalidInput {
            input: input.to_string(),
            reason,
        };

        let channels = input
            .split(',')
            .map(|part| part.trim().parse::<i64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid("channels must be integers"))?;

        match channels.as_slice() {
            [red, green, blue] => Self::from_channels(*red, *green, *blue)
                .map_err(|_| invalid("channel outside 0..=255")),
            _ => Err(invalid("expected exactly three channels")),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rgb: Srgb<u8> = self.rgb.into_format();
        write!(f, "#{:02X}{:02X}{:02X}", rgb.red, rgb.green, rgb.blue)
    }
}
