//! Hue progression strategies selected once per run from the configured mode.

use std::{fmt, str::FromStr};

use rand::Rng;

use crate::{
    color::Color,
    gradient::{ColorTable, GradientError, build_gradient},
};

/// Number of distinct hue values accepted by the device (`0..=359`).
pub const HUE_RANGE: u16 = 360;

/// Kind of hue change declared by a mode's `type` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Uniformly random hue on every call.
    Random,
    /// Device hue plus one, wrapping at 360.
    Rotate,
    /// Walk a precomputed gradient through named colors.
    Linear,
}

impl StrategyKind {
    /// Name used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Random => "random",
            StrategyKind::Rotate => "rotate",
            StrategyKind::Linear => "linear",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "random" => Ok(StrategyKind::Random),
            "rotate" => Ok(StrategyKind::Rotate),
            "linear" => Ok(StrategyKind::Linear),
            other => Err(format!(
                "unknown mode type `{other}` (expected random, rotate or linear)"
            )),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cursor over a closed gradient sequence.
#[derive(Debug, Clone)]
pub struct GradientCursor {
    sequence: Vec<Color>,
    position: usize,
}

impl GradientCursor {
    /// Wrap a non-empty sequence, starting at its first color.
    fn new(sequence: Vec<Color>) -> Self {
        Self {
            sequence,
            position: 0,
        }
    }

    /// Index of the color the next call will emit.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Colors the cursor cycles through.
    pub fn sequence(&self) -> &[Color] {
        &self.sequence
    }

    fn advance(&mut self) -> Color {
        let color = self.sequence[self.position];
        self.position = (self.position + 1) % self.sequence.len();
        color
    }
}

/// Strategy computing the next hue pushed to the device.
#[derive(Debug, Clone)]
pub enum HueStrategy {
    /// Stateless uniform sampling over `0..=359`.
    Random,
    /// Increment the hue reported by the device.
    Rotate,
    /// Replay a gradient, ignoring the device's current hue.
    Linear(GradientCursor),
}

impl HueStrategy {
    /// Build the linear variant through `names`, resolved against `table`.
    pub fn linear(
        names: &[String],
        table: &ColorTable,
        steps: usize,
    ) -> Result<Self, GradientError> {
        let sequence = build_gradient(names, table, steps)?;
        Ok(HueStrategy::Linear(GradientCursor::new(sequence)))
    }

    /// Variant backing this strategy.
    pub fn kind(&self) -> StrategyKind {
        match self {
            HueStrategy::Random => StrategyKind::Random,
            HueStrategy::Rotate => StrategyKind::Rotate,
            HueStrategy::Linear(_) => StrategyKind::Linear,
        }
    }

    /// Colors replayed by the linear variant.
    pub fn gradient(&self) -> Option<&[Color]> {
        match self {
            HueStrategy::Linear(cursor) => Some(cursor.sequence()),
            HueStrategy::Random | HueStrategy::Rotate => None,
        }
    }

    /// Compute the hue to push, given the hue just read from the device.
    pub fn next_hue(&mut self, current: u16) -> u16 {
        match self {
            HueStrategy::Random => rand::rng().random_range(0..HUE_RANGE),
            HueStrategy::Rotate => (current % HUE_RANGE + 1) % HUE_RANGE,
            HueStrategy::Linear(cursor) => cursor.advance().device_hue(),
        }
    }
}
