//! Intensity rescaling module
//!
//! Compresses 16-bit channels into 8 bits with a per-channel affine map, so
//! the original intensities can be approximately reconstructed from the
//! stored [`IntensityTransform`].

use tracing::{debug, instrument};

use crate::texture_pipeline::common::error::{ConversionError, Result};
use crate::texture_pipeline::volume::{Volume, VolumeData};

/// Percentile of non-zero samples mapped just above zero.
pub const LOW_PERCENTILE: f64 = 2.0;

/// Fraction of the median→max span kept below saturation.
pub const HIGH_FRACTION: f64 = 0.9;

const NARROW_MAX: f64 = u8::MAX as f64;

/// `narrow = clamp(round((wide - offset) / scale), 0, 255)`, with zero pinned to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityTransform {
    pub scale: f64,
    pub offset: f64,
}

impl IntensityTransform {
    pub fn narrow(&self, wide: u16) -> u8 {
        if wide == 0 {
            return 0;
        }
        ((wide as f64 - self.offset) / self.scale)
            .round()
            .clamp(0.0, NARROW_MAX) as u8
    }

    /// Approximate original intensity of a stored 8-bit sample.
    pub fn reconstruct(&self, narrow: u8) -> f64 {
        if narrow == 0 {
            return 0.0;
        }
        narrow as f64 * self.scale + self.offset
    }
}

/// An 8-bit channel together with the map that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RescaledChannel {
    pub volume: Volume,
    pub transform: IntensityTransform,
}

/// Histogram of the non-zero samples of a 16-bit channel.
struct NonZeroHistogram {
    counts: Vec<u64>,
    total: u64,
    min: u16,
    max: u16,
}

impl NonZeroHistogram {
    fn from_samples(values: &[u16]) -> Option<Self> {
        let mut counts = vec![0u64; u16::MAX as usize + 1];
        let mut total = 0;
        let (mut min, mut max) = (u16::MAX, 0u16);
        for &value in values.iter().filter(|&&v| v != 0) {
            counts[value as usize] += 1;
            total += 1;
            min = min.min(value);
            max = max.max(value);
        }
        (total > 0).then_some(Self {
            counts,
            total,
            min,
            max,
        })
    }

    /// Value at zero-based `rank` in sorted order.
    fn value_at_rank(&self, rank: u64) -> u16 {
        let mut seen = 0;
        for value in self.min..=self.max {
            seen += self.counts[value as usize];
            if seen > rank {
                return value;
            }
        }
        self.max
    }

    /// Percentile with linear interpolation between neighbouring ranks.
    fn percentile(&self, percent: f64) -> f64 {
        let rank = percent / 100.0 * (self.total - 1) as f64;
        let (lower, upper) = (rank.floor(), rank.ceil());
        let a = self.value_at_rank(lower as u64) as f64;
        let b = self.value_at_rank(upper as u64) as f64;
        a + (b - a) * (rank - lower)
    }
}

fn choose_transform(histogram: &NonZeroHistogram) -> Result<IntensityTransform> {
    let (min, max) = (histogram.min as f64, histogram.max as f64);
    if max - min <= NARROW_MAX {
        return Ok(IntensityTransform {
            scale: 1.0,
            offset: min - 1.0,
        });
    }

    let low = histogram.percentile(LOW_PERCENTILE);
    let median = histogram.percentile(50.0);
    let high = median + HIGH_FRACTION * (max - median);
    let scale = (high - low) / NARROW_MAX;
    debug!(low, median, high, scale, "Clipping intensity range");

    if scale <= 0.0 {
        return Err(ConversionError::DegenerateStatistics(format!(
            "clipped intensity range [{}, {}] is empty",
            low, high
        )));
    }
    Ok(IntensityTransform {
        scale,
        offset: low - 1.0,
    })
}

/// Maps a single 16-bit channel to 8 bits.
///
/// Fails with `UnsupportedType` for any other element type and with
/// `DegenerateStatistics` when the channel holds no non-zero sample.
#[instrument(skip(channel), fields(shape = %channel.shape()))]
pub fn rescale_to_u8(channel: &Volume) -> Result<RescaledChannel> {
    if channel.channels() != 1 {
        return Err(ConversionError::ShapeMismatch(format!(
            "intensity rescaling expects one channel, got {}",
            channel.channels()
        )));
    }
    let VolumeData::U16(values) = channel.data() else {
        return Err(ConversionError::UnsupportedType(format!(
            "intensity rescaling from {} is not implemented",
            channel.element_type().name()
        )));
    };

    let histogram = NonZeroHistogram::from_samples(values).ok_or_else(|| {
        ConversionError::DegenerateStatistics("channel has no non-zero samples".to_string())
    })?;
    let transform = choose_transform(&histogram)?;
    debug!(
        scale = transform.scale,
        offset = transform.offset,
        "Rescaling intensity to 8 bits"
    );

    let narrow = values.iter().map(|&v| transform.narrow(v)).collect();
    Ok(RescaledChannel {
        volume: Volume::from_u8(channel.shape(), narrow)?,
        transform,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture_pipeline::volume::Shape;
    use proptest::prelude::*;

    fn channel(values: Vec<u16>) -> Volume {
        let width = values.len();
        Volume::from_u16(Shape::new(1, 1, width), values).unwrap()
    }

    #[test]
    fn test_narrow_range_is_a_lossless_shift() {
        let mut values: Vec<u16> = (1000..=1200).collect();
        values.extend([0, 0, 0]);
        let rescaled = rescale_to_u8(&channel(values.clone())).unwrap();

        assert_eq!(
            rescaled.transform,
            IntensityTransform {
                scale: 1.0,
                offset: 999.0
            }
        );
        let VolumeData::U8(out) = rescaled.volume.data() else {
            panic!("expected u8 output");
        };
        for (&wide, &narrow) in values.iter().zip(out) {
            if wide == 0 {
                assert_eq!(narrow, 0);
            } else {
                assert_eq!(narrow as f64, wide as f64 - 999.0);
            }
        }
    }

    #[test]
    fn test_wide_range_clips_outliers() {
        let mut values: Vec<u16> = (1..=1000).collect();
        values.push(0);
        let rescaled = rescale_to_u8(&channel(values)).unwrap();
        let t = rescaled.transform;

        // p2 = 20.98, median = 500.5, high = 950.05
        assert!((t.offset - 19.98).abs() < 1e-9);
        assert!((t.scale - (950.05 - 20.98) / 255.0).abs() < 1e-9);
        assert_eq!(t.narrow(1000), 255);
        assert_eq!(t.narrow(1), 0);
        assert_eq!(t.narrow(0), 0);
    }

    #[test]
    fn test_reconstruct_inverts_lossless_shift() {
        let t = IntensityTransform {
            scale: 1.0,
            offset: 499.0,
        };
        assert_eq!(t.reconstruct(t.narrow(600)), 600.0);
        assert_eq!(t.reconstruct(0), 0.0);
    }

    #[test]
    fn test_all_zero_channel_is_degenerate() {
        let result = rescale_to_u8(&channel(vec![0; 16]));
        assert!(matches!(
            result,
            Err(ConversionError::DegenerateStatistics(_))
        ));
    }

    #[test]
    fn test_other_element_types_are_unsupported() {
        let narrow = Volume::from_u8(Shape::new(1, 1, 2), vec![1, 2]).unwrap();
        assert!(matches!(
            rescale_to_u8(&narrow),
            Err(ConversionError::UnsupportedType(_))
        ));
        let float = Volume::from_f32(Shape::new(1, 1, 2), vec![1.0, 2.0]).unwrap();
        assert!(matches!(
            rescale_to_u8(&float),
            Err(ConversionError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_percentile_interpolates() {
        let histogram = NonZeroHistogram::from_samples(&[10, 20, 30, 40]).unwrap();
        assert_eq!(histogram.percentile(50.0), 25.0);
        assert_eq!(histogram.percentile(0.0), 10.0);
        assert_eq!(histogram.percentile(100.0), 40.0);
    }

    proptest! {
        #[test]
        fn test_zero_stays_zero(values in proptest::collection::vec(0u16..=u16::MAX, 1..200)) {
            prop_assume!(values.iter().any(|&v| v != 0));
            let rescaled = match rescale_to_u8(&channel(values.clone())) {
                Ok(rescaled) => rescaled,
                Err(ConversionError::DegenerateStatistics(_)) => return Ok(()),
                Err(other) => return Err(TestCaseError::fail(other.to_string())),
            };
            let VolumeData::U8(out) = rescaled.volume.data() else {
                return Err(TestCaseError::fail("expected u8 output"));
            };
            for (&wide, &narrow) in values.iter().zip(out) {
                if wide == 0 {
                    prop_assert_eq!(narrow, 0);
                }
            }
        }
    }
}
