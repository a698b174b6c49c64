//! Container types

use crate::texture_pipeline::common::error::{ConversionError, Result};
use crate::texture_pipeline::header::TextureHeader;
use crate::texture_pipeline::metadata::MetadataMap;
use crate::texture_pipeline::mipmap::MipChain;
use crate::texture_pipeline::rescale::IntensityTransform;

/// File identifier: `«KTXVOL»\r\n\x1A\n`.
pub const IDENTIFIER: [u8; 12] = [
    0xAB, 0x4B, 0x54, 0x58, 0x56, 0x4F, 0x4C, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
];

/// Written in the file's byte order; readers detect the order from it.
pub const ENDIANNESS_MARKER: u32 = 0x0403_0201;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// Compression applied independently to each mip level payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadCompression {
    /// Raw sample bytes
    #[default]
    None,
    /// zlib stream at the fastest compression level
    Deflate,
}

impl PayloadCompression {
    pub fn code(self) -> u32 {
        match self {
            PayloadCompression::None => 0,
            PayloadCompression::Deflate => 1,
        }
    }

    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(PayloadCompression::None),
            1 => Ok(PayloadCompression::Deflate),
            other => Err(ConversionError::MalformedContainer(format!(
                "unknown compression code {}",
                other
            ))),
        }
    }
}

/// Everything written to one container file.
///
/// Built once by [`TextureContainer::assemble`], which runs every check the
/// writer relies on; the parts are read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureContainer {
    header: TextureHeader,
    metadata: MetadataMap,
    intensity_transforms: Vec<IntensityTransform>,
    mip_chain: MipChain,
}

impl TextureContainer {
    /// `intensity_transforms` is either empty or holds one entry per channel.
    pub fn assemble(
        mip_chain: MipChain,
        metadata: MetadataMap,
        intensity_transforms: Vec<IntensityTransform>,
    ) -> Result<Self> {
        let header = TextureHeader::for_mip_chain(&mip_chain)?;
        let container = Self {
            header,
            metadata,
            intensity_transforms,
            mip_chain,
        };
        container.validate()?;
        Ok(container)
    }

    /// Checks that the container can be serialized without a mid-stream failure.
    pub fn validate(&self) -> Result<()> {
        let expected = TextureHeader::for_mip_chain(&self.mip_chain)?;
        if expected != self.header {
            return Err(ConversionError::InvalidMetadata(
                "header does not describe the mip chain".to_string(),
            ));
        }

        self.metadata.validate()?;

        let transforms = self.intensity_transforms.len();
        if transforms != 0 && transforms != self.mip_chain.channels() {
            return Err(ConversionError::InvalidMetadata(format!(
                "{} intensity transforms for {} channels",
                transforms,
                self.mip_chain.channels()
            )));
        }
        for (channel, transform) in self.intensity_transforms.iter().enumerate() {
            if !(transform.scale.is_finite() && transform.scale > 0.0)
                || !transform.offset.is_finite()
            {
                return Err(ConversionError::InvalidMetadata(format!(
                    "channel {} has unusable intensity transform {:?}",
                    channel, transform
                )));
            }
        }
        Ok(())
    }

    pub fn header(&self) -> &TextureHeader {
        &self.header
    }

    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    pub fn intensity_transforms(&self) -> &[IntensityTransform] {
        &self.intensity_transforms
    }

    pub fn mip_chain(&self) -> &MipChain {
        &self.mip_chain
    }
}
