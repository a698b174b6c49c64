//! Spatial downsampling module
//!
//! Box-filter reduction of volumes. The XY pre-pass lives here; the mipmap
//! builder reuses the same kernel with downward rounding.

mod kernel;
pub mod types;

use tracing::debug;

use crate::texture_pipeline::common::error::Result;
use crate::texture_pipeline::volume::{Sample, Shape, Volume, VolumeData};

pub use types::{DEFAULT_BLEND_WEIGHT, Filter, Rounding};

/// Halves height and width (rounding up), leaving depth untouched.
///
/// Each output sample is the filtered value of its 2×2 source block; a ragged
/// last row or column yields a smaller block.
pub fn downsample_xy(volume: &Volume, filter: Filter) -> Result<Volume> {
    let from = volume.shape();
    let to = Shape::new(
        from.depth,
        Rounding::Up.halve(from.height),
        Rounding::Up.halve(from.width),
    );
    debug!(%from, %to, %filter, "Downsampling in X & Y");
    reduce_volume(volume, to, filter)
}

/// Reduces `volume` to `to`, where each axis of `to` is either unchanged or halved.
pub(crate) fn reduce_volume(volume: &Volume, to: Shape, filter: Filter) -> Result<Volume> {
    filter.validate()?;
    let data = match volume.data() {
        VolumeData::U8(values) => reduce_typed(values, volume, to, filter),
        VolumeData::U16(values) => reduce_typed(values, volume, to, filter),
        VolumeData::F32(values) => reduce_typed(values, volume, to, filter),
    };
    Volume::new(to, volume.channels(), data)
}

fn reduce_typed<T: Sample>(values: &[T], volume: &Volume, to: Shape, filter: Filter) -> VolumeData {
    T::wrap(kernel::reduce_blocks(
        values,
        volume.shape(),
        volume.channels(),
        to,
        filter,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture_pipeline::common::error::ConversionError;

    fn plane_u16(height: usize, width: usize, values: Vec<u16>) -> Volume {
        Volume::from_u16(Shape::new(1, height, width), values).unwrap()
    }

    #[test]
    fn test_maximum_of_uniform_volume_is_uniform() {
        let volume = Volume::from_u16(Shape::new(3, 5, 7), vec![417u16; 105]).unwrap();
        let out = downsample_xy(&volume, Filter::Maximum).unwrap();
        assert_eq!(out.shape(), Shape::new(3, 3, 4));
        assert_eq!(out.data(), &VolumeData::U16(vec![417u16; 36]));
    }

    #[test]
    fn test_each_filter_on_one_block() {
        let volume = plane_u16(2, 2, vec![1, 2, 4, 10]);
        let reduce = |filter| match downsample_xy(&volume, filter).unwrap().into_data() {
            VolumeData::U16(v) => v[0],
            _ => unreachable!(),
        };
        assert_eq!(reduce(Filter::Minimum), 1);
        assert_eq!(reduce(Filter::Maximum), 10);
        // 17 / 4 = 4.25
        assert_eq!(reduce(Filter::Mean), 4);
        // 4.25 + 0.5 * 5.75 = 7.125
        assert_eq!(reduce(Filter::blended()), 7);
        assert_eq!(reduce(Filter::Blended { weight: 1.0 }), 10);
    }

    #[test]
    fn test_odd_axes_round_up_with_ragged_edge() {
        // 3x3 plane:
        // 1 2 3
        // 4 5 6
        // 7 8 9
        let volume = plane_u16(3, 3, (1..=9).collect());
        let out = downsample_xy(&volume, Filter::Maximum).unwrap();
        assert_eq!(out.shape(), Shape::new(1, 2, 2));
        assert_eq!(out.data(), &VolumeData::U16(vec![5, 6, 8, 9]));
    }

    #[test]
    fn test_mean_does_not_overflow_u16() {
        let volume = plane_u16(2, 2, vec![u16::MAX; 4]);
        let out = downsample_xy(&volume, Filter::Mean).unwrap();
        assert_eq!(out.data(), &VolumeData::U16(vec![u16::MAX]));
    }

    #[test]
    fn test_float_mean_is_not_rounded() {
        let volume = Volume::from_f32(Shape::new(1, 1, 2), vec![0.5, 1.0]).unwrap();
        let out = downsample_xy(&volume, Filter::Mean).unwrap();
        assert_eq!(out.data(), &VolumeData::F32(vec![0.75]));
    }

    #[test]
    fn test_depth_is_left_alone() {
        let volume = Volume::from_u8(Shape::new(4, 2, 2), vec![9u8; 16]).unwrap();
        let out = downsample_xy(&volume, Filter::Minimum).unwrap();
        assert_eq!(out.shape(), Shape::new(4, 1, 1));
    }

    #[test]
    fn test_default_filter_is_maximum() {
        assert_eq!(Filter::default(), Filter::Maximum);
        assert!(Filter::blended().validate().is_ok());
    }

    #[test]
    fn test_invalid_blend_weight_is_rejected() {
        let volume = plane_u16(2, 2, vec![0; 4]);
        let result = downsample_xy(&volume, Filter::Blended { weight: 1.5 });
        assert!(matches!(result, Err(ConversionError::InvalidConfig(_))));
    }
}
