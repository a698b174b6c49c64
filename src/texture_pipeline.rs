//! Volume texture pipeline module
//!
//! Turns per-channel TIFF stacks into a single mipmapped volume texture
//! container, with separate modules for reading, filtering, metadata and
//! container serialization.

pub mod common;
pub mod config;
pub mod container;
pub mod conversions;
pub mod downsample;
pub mod header;
pub mod interleave;
pub mod metadata;
pub mod mipmap;
pub mod rescale;
pub mod tiff;
pub mod timing;
pub mod volume;

pub use common::{ConversionError, Result};

pub use config::{ConversionConfig, ConversionConfigBuilder};

pub use container::{
    ContainerWriter, DecodedContainer, Endianness, PayloadCompression, StandardContainerWriter,
    TextureContainer, encode_container, read_container,
};

pub use conversions::{PreparedLevels, TiffToKtxPipeline};

pub use downsample::{Filter, downsample_xy};

pub use header::TextureHeader;

pub use interleave::interleave_channels;

pub use metadata::{GeometryFacts, MetadataMap, MetadataValue, Provenance, VolumeGeometry};

pub use mipmap::{MipChain, MipLevels, build_mip_chain};

pub use rescale::{IntensityTransform, RescaledChannel, rescale_to_u8};

pub use tiff::{ChannelVolumeReader, TiffStackReader};

pub use timing::{PipelineTimings, StageTiming, Timer};

pub use volume::{ElementType, Shape, Volume, VolumeData};
