//! Downsampling filter types

use crate::texture_pipeline::common::error::{ConversionError, Result};

/// Blend weight used when none is configured.
pub const DEFAULT_BLEND_WEIGHT: f64 = 0.5;

/// Reduction applied to each block of source samples.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Filter {
    /// Smallest sample in the block
    Minimum,
    /// Largest sample in the block
    #[default]
    Maximum,
    /// Rounded average of the block
    Mean,
    /// `mean + weight * (max - mean)`
    Blended { weight: f64 },
}

impl Filter {
    pub fn blended() -> Self {
        Filter::Blended {
            weight: DEFAULT_BLEND_WEIGHT,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Filter::Blended { weight } = self
            && !(0.0..=1.0).contains(weight)
        {
            return Err(ConversionError::InvalidConfig(format!(
                "blend weight {} is outside [0, 1]",
                weight
            )));
        }
        Ok(())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Filter::Minimum => "min",
            Filter::Maximum => "max",
            Filter::Mean => "mean",
            Filter::Blended { .. } => "blended",
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::Blended { weight } => write!(f, "blended({})", weight),
            other => f.write_str(other.name()),
        }
    }
}

/// How a halved axis length is rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// `ceil(n / 2)`: an odd trailing sample forms its own bin.
    Up,
    /// `max(floor(n / 2), 1)`: an odd trailing sample joins the last bin.
    Down,
}

impl Rounding {
    pub fn halve(self, length: usize) -> usize {
        match self {
            Rounding::Up => length.div_ceil(2),
            Rounding::Down => (length / 2).max(1),
        }
    }
}
