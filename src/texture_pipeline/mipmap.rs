//! Mipmap pyramid module
//!
//! Builds the chain of successively halved volumes stored in the container.

use tracing::{debug, instrument, warn};

use crate::texture_pipeline::common::error::{ConversionError, Result};
use crate::texture_pipeline::downsample::{Filter, Rounding, reduce_volume};
use crate::texture_pipeline::volume::{ElementType, Shape, Volume};

/// How many pyramid levels to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MipLevels {
    /// Keep halving until every axis is 1.
    #[default]
    Auto,
    /// Stop after this many levels (including the base level). `0` behaves
    /// like [`MipLevels::Auto`].
    Count(usize),
}

impl From<usize> for MipLevels {
    /// `0` selects [`MipLevels::Auto`].
    fn from(count: usize) -> Self {
        if count == 0 {
            MipLevels::Auto
        } else {
            MipLevels::Count(count)
        }
    }
}

/// Shape of the level below `shape`.
pub fn mip_dimension(shape: Shape) -> Shape {
    Shape::new(
        Rounding::Down.halve(shape.depth),
        Rounding::Down.halve(shape.height),
        Rounding::Down.halve(shape.width),
    )
}

/// Number of levels a full pyramid over `shape` has, base level included.
pub fn max_mip_levels(shape: Shape) -> usize {
    1 + shape.max_dimension().ilog2() as usize
}

/// Ordered pyramid; level 0 is full resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct MipChain {
    levels: Vec<Volume>,
}

impl MipChain {
    /// Checks that levels share channel count and element type and that
    /// each level is exactly the halved shape of its predecessor.
    pub fn new(levels: Vec<Volume>) -> Result<Self> {
        let Some(base) = levels.first() else {
            return Err(ConversionError::InvalidConfig(
                "a mip chain needs at least one level".to_string(),
            ));
        };
        let (channels, element_type) = (base.channels(), base.element_type());

        for (index, pair) in levels.windows(2).enumerate() {
            let (upper, lower) = (&pair[0], &pair[1]);
            if lower.channels() != channels || lower.element_type() != element_type {
                return Err(ConversionError::ShapeMismatch(format!(
                    "mip level {} has {} {} channels, expected {} {}",
                    index + 1,
                    lower.channels(),
                    lower.element_type().name(),
                    channels,
                    element_type.name()
                )));
            }
            let expected = mip_dimension(upper.shape());
            if upper.shape().is_unit() || lower.shape() != expected {
                return Err(ConversionError::ShapeMismatch(format!(
                    "mip level {} is {}, expected {}",
                    index + 1,
                    lower.shape(),
                    expected
                )));
            }
        }

        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[Volume] {
        &self.levels
    }

    pub fn base(&self) -> &Volume {
        &self.levels[0]
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn channels(&self) -> usize {
        self.base().channels()
    }

    pub fn element_type(&self) -> ElementType {
        self.base().element_type()
    }
}

/// Produces the next coarser level: depth & height first, then width.
pub fn next_mip_level(volume: &Volume, filter: Filter) -> Result<Volume> {
    let from = volume.shape();
    let target = mip_dimension(from);
    let depth_height = reduce_volume(
        volume,
        Shape::new(target.depth, target.height, from.width),
        filter,
    )?;
    reduce_volume(&depth_height, target, filter)
}

/// Builds the pyramid for `base`, which becomes level 0 unchanged.
#[instrument(skip(base), fields(shape = %base.shape(), channels = base.channels()))]
pub fn build_mip_chain(base: Volume, filter: Filter, levels: MipLevels) -> Result<MipChain> {
    let full = max_mip_levels(base.shape());
    let count = match levels {
        MipLevels::Auto | MipLevels::Count(0) => full,
        MipLevels::Count(requested) if requested > full => {
            warn!(requested, available = full, "Clamping mip level count");
            full
        }
        MipLevels::Count(requested) => requested,
    };

    let mut chain = Vec::with_capacity(count);
    chain.push(base);
    while chain.len() < count {
        let next = next_mip_level(&chain[chain.len() - 1], filter)?;
        debug!(level = chain.len(), shape = %next.shape(), "Built mip level");
        chain.push(next);
    }

    MipChain::new(chain)
}
