//! Closed gradient sequences built from an ordered list of named colors.

use indexmap::IndexMap;
use thiserror::Error;

use crate::color::Color;

/// Lookup table from configured color names to colors.
pub type ColorTable = IndexMap<String, Color>;

/// Step count used when a linear mode does not declare one.
pub const DEFAULT_STEPS: usize = 10;

/// Failures raised while building a gradient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GradientError {
    /// A referenced name is missing from the color table.
    #[error("unknown color `{name}`")]
    UnknownColor {
        /// Name that could not be resolved.
        name: String,
    },
    /// A gradient needs at least two colors to interpolate between.
    #[error("at least 2 colors are required, got {count}")]
    TooFewColors {
        /// Number of colors provided.
        count: usize,
    },
    /// Interpolation needs at least two steps per segment.
    #[error("step count must be at least 2, got {steps}")]
    InvalidSteps {
        /// Rejected step count.
        steps: usize,
    },
}

/// Build the cyclic gradient through `names`, wrapping from the last color back to the first.
///
/// Each segment contributes `steps - 1` colors: its start color plus the intermediates. The
/// end color of a segment is dropped because it opens the next segment (or, for the wrap
/// segment, sits at index 0), so the sequence can be replayed forever without a doubled frame.
pub fn build_gradient(
    names: &[String],
    table: &ColorTable,
    steps: usize,
) -> Result<Vec<Color>, GradientError> {
    if names.len() < 2 {
        return Err(GradientError::TooFewColors { count: names.len() });
    }
    if steps < 2 {
        return Err(GradientError::InvalidSteps { steps });
    }

    let colors = names
        .iter()
        .map(|name| {
            table
                .get(name)
                .copied()
                .ok_or_else(|| GradientError::UnknownColor { name: name.clone() })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut sequence = Vec::with_capacity(colors.len() * (steps - 1));
    for (index, start) in colors.iter().enumerate() {
        let end = &colors[(index + 1) % colors.len()];
        let mut segment = start.interpolate(end, steps);
        segment.pop();
        sequence.extend(segment);
    }

    Ok(sequence)
}
