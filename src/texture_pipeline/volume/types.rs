//! Volume data types

use crate::texture_pipeline::common::error::{ConversionError, Result};

/// Numeric type of a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    U8,
    U16,
    F32,
}

impl ElementType {
    /// Size of one sample in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            ElementType::U8 => 1,
            ElementType::U16 => 2,
            ElementType::F32 => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementType::U8 => "uint8",
            ElementType::U16 => "uint16",
            ElementType::F32 => "float32",
        }
    }
}

/// Spatial extent of a volume, slowest axis first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    pub depth: usize,
    pub height: usize,
    pub width: usize,
}

impl Shape {
    pub const fn new(depth: usize, height: usize, width: usize) -> Self {
        Self { depth, height, width }
    }

    pub fn voxel_count(&self) -> usize {
        self.depth * self.height * self.width
    }

    /// True once every spatial axis has collapsed to a single sample.
    pub fn is_unit(&self) -> bool {
        self.depth == 1 && self.height == 1 && self.width == 1
    }

    pub fn max_dimension(&self) -> usize {
        self.depth.max(self.height).max(self.width)
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.depth, self.height, self.width)
    }
}

/// Typed sample storage, row-major with the channel axis fastest.
#[derive(Debug, Clone, PartialEq)]
pub enum VolumeData {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F32(Vec<f32>),
}

impl VolumeData {
    pub fn element_type(&self) -> ElementType {
        match self {
            VolumeData::U8(_) => ElementType::U8,
            VolumeData::U16(_) => ElementType::U16,
            VolumeData::F32(_) => ElementType::F32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            VolumeData::U8(values) => values.len(),
            VolumeData::U16(values) => values.len(),
            VolumeData::F32(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A 3-D block of samples with one or more interleaved channels.
///
/// A freshly loaded channel has `channels == 1`; the interleaver produces
/// multi-channel volumes where the samples of one voxel are contiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    shape: Shape,
    channels: usize,
    data: VolumeData,
}

impl Volume {
    /// Wraps `data`, checking that it holds exactly `shape × channels` samples.
    pub fn new(shape: Shape, channels: usize, data: VolumeData) -> Result<Self> {
        if shape.voxel_count() == 0 {
            return Err(ConversionError::InvalidDimensions(
                shape.depth,
                shape.height,
                shape.width,
            ));
        }
        if channels == 0 {
            return Err(ConversionError::InvalidConfig(
                "a volume needs at least one channel".to_string(),
            ));
        }
        let expected = shape.voxel_count() * channels;
        if data.len() != expected {
            return Err(ConversionError::BufferLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            shape,
            channels,
            data,
        })
    }

    pub fn from_u8(shape: Shape, values: Vec<u8>) -> Result<Self> {
        Self::new(shape, 1, VolumeData::U8(values))
    }

    pub fn from_u16(shape: Shape, values: Vec<u16>) -> Result<Self> {
        Self::new(shape, 1, VolumeData::U16(values))
    }

    pub fn from_f32(shape: Shape, values: Vec<f32>) -> Result<Self> {
        Self::new(shape, 1, VolumeData::F32(values))
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    pub fn data(&self) -> &VolumeData {
        &self.data
    }

    pub fn into_data(self) -> VolumeData {
        self.data
    }

    /// Payload size in bytes when stored uncompressed.
    pub fn byte_len(&self) -> usize {
        self.data.len() * self.element_type().size_bytes()
    }
}
