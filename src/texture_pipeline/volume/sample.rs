//! Per-element numeric behaviour shared by the filters.

use crate::texture_pipeline::volume::types::{ElementType, VolumeData};

/// A sample type that can be stored in a [`VolumeData`].
///
/// Filters accumulate in `f64`, which is exact for every supported integer
/// type, and convert back with `from_f64`.
pub trait Sample: Copy + PartialOrd + Default + std::fmt::Debug + 'static {
    const ELEMENT_TYPE: ElementType;

    fn to_f64(self) -> f64;

    /// Rounds to nearest and clamps to the type's range for integer types.
    fn from_f64(value: f64) -> Self;

    fn slice(data: &VolumeData) -> Option<&[Self]>;

    fn wrap(values: Vec<Self>) -> VolumeData;
}

impl Sample for u8 {
    const ELEMENT_TYPE: ElementType = ElementType::U8;

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value.round().clamp(0.0, u8::MAX as f64) as u8
    }

    fn slice(data: &VolumeData) -> Option<&[Self]> {
        match data {
            VolumeData::U8(values) => Some(values),
            _ => None,
        }
    }

    fn wrap(values: Vec<Self>) -> VolumeData {
        VolumeData::U8(values)
    }
}

impl Sample for u16 {
    const ELEMENT_TYPE: ElementType = ElementType::U16;

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value.round().clamp(0.0, u16::MAX as f64) as u16
    }

    fn slice(data: &VolumeData) -> Option<&[Self]> {
        match data {
            VolumeData::U16(values) => Some(values),
            _ => None,
        }
    }

    fn wrap(values: Vec<Self>) -> VolumeData {
        VolumeData::U16(values)
    }
}

impl Sample for f32 {
    const ELEMENT_TYPE: ElementType = ElementType::F32;

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn slice(data: &VolumeData) -> Option<&[Self]> {
        match data {
            VolumeData::F32(values) => Some(values),
            _ => None,
        }
    }

    fn wrap(values: Vec<Self>) -> VolumeData {
        VolumeData::F32(values)
    }
}
