//! Channel interleaving module
//!
//! Packs single-channel volumes into one volume with the channel axis fastest,
//! which is the layout the container stores.

use tracing::debug;

use crate::texture_pipeline::common::error::{ConversionError, Result};
use crate::texture_pipeline::volume::{Sample, Volume, VolumeData};

/// Interleaves `channels`, in order, into one multi-channel volume.
///
/// Every input must be single-channel and share shape and element type with
/// the first. A single input passes through unchanged.
pub fn interleave_channels(channels: &[Volume]) -> Result<Volume> {
    let Some(first) = channels.first() else {
        return Err(ConversionError::InvalidConfig(
            "no channels to interleave".to_string(),
        ));
    };

    for (index, channel) in channels.iter().enumerate() {
        if channel.channels() != 1 {
            return Err(ConversionError::ShapeMismatch(format!(
                "channel {} already has {} channels",
                index,
                channel.channels()
            )));
        }
        if channel.shape() != first.shape() {
            return Err(ConversionError::ShapeMismatch(format!(
                "channel {} is {}, channel 0 is {}",
                index,
                channel.shape(),
                first.shape()
            )));
        }
        if channel.element_type() != first.element_type() {
            return Err(ConversionError::ShapeMismatch(format!(
                "channel {} is {}, channel 0 is {}",
                index,
                channel.element_type().name(),
                first.element_type().name()
            )));
        }
    }

    debug!(
        channels = channels.len(),
        shape = %first.shape(),
        "Interleaving channels"
    );

    let data = match first.data() {
        VolumeData::U8(_) => interleave_typed::<u8>(channels),
        VolumeData::U16(_) => interleave_typed::<u16>(channels),
        VolumeData::F32(_) => interleave_typed::<f32>(channels),
    };
    Volume::new(first.shape(), channels.len(), data)
}

fn interleave_typed<T: Sample>(channels: &[Volume]) -> VolumeData {
    // element types were checked by the caller
    let sources: Vec<&[T]> = channels
        .iter()
        .filter_map(|channel| T::slice(channel.data()))
        .collect();
    let voxels = sources.first().map_or(0, |s| s.len());

    let mut out = Vec::with_capacity(voxels * sources.len());
    for i in 0..voxels {
        out.extend(sources.iter().map(|source| source[i]));
    }
    T::wrap(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture_pipeline::volume::Shape;

    #[test]
    fn test_two_channels_pair_up() {
        let a = Volume::from_u16(Shape::new(1, 1, 5), vec![1, 2, 3, 4, 5]).unwrap();
        let b = Volume::from_u16(Shape::new(1, 1, 5), vec![6, 7, 8, 9, 10]).unwrap();
        let combined = interleave_channels(&[a, b]).unwrap();

        assert_eq!(combined.channels(), 2);
        assert_eq!(combined.shape(), Shape::new(1, 1, 5));
        assert_eq!(
            combined.data(),
            &VolumeData::U16(vec![1, 6, 2, 7, 3, 8, 4, 9, 5, 10])
        );
    }

    #[test]
    fn test_single_channel_passes_through() {
        let a = Volume::from_u8(Shape::new(2, 1, 2), vec![4, 3, 2, 1]).unwrap();
        let combined = interleave_channels(std::slice::from_ref(&a)).unwrap();
        assert_eq!(combined, a);
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let a = Volume::from_u16(Shape::new(1, 1, 4), vec![0; 4]).unwrap();
        let b = Volume::from_u16(Shape::new(1, 2, 2), vec![0; 4]).unwrap();
        let result = interleave_channels(&[a, b]);
        assert!(matches!(result, Err(ConversionError::ShapeMismatch(_))));
    }

    #[test]
    fn test_element_type_mismatch_is_rejected() {
        let a = Volume::from_u16(Shape::new(1, 1, 2), vec![0; 2]).unwrap();
        let b = Volume::from_u8(Shape::new(1, 1, 2), vec![0; 2]).unwrap();
        let result = interleave_channels(&[a, b]);
        assert!(matches!(result, Err(ConversionError::ShapeMismatch(_))));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(interleave_channels(&[]).is_err());
    }
}
