//! Texture header module
//!
//! Derives the format-mandated header fields (OpenGL type and format codes,
//! pixel dimensions, mip count) from a finished mip chain.

use crate::texture_pipeline::common::error::{ConversionError, Result};
use crate::texture_pipeline::mipmap::MipChain;
use crate::texture_pipeline::volume::ElementType;

pub mod gl {
    pub const UNSIGNED_BYTE: u32 = 0x1401;
    pub const UNSIGNED_SHORT: u32 = 0x1403;
    pub const FLOAT: u32 = 0x1406;

    pub const RED: u32 = 0x1903;
    pub const RG: u32 = 0x8227;
    pub const RGB: u32 = 0x1907;
    pub const RGBA: u32 = 0x1908;

    pub const R8: u32 = 0x8229;
    pub const RG8: u32 = 0x822B;
    pub const RGB8: u32 = 0x8051;
    pub const RGBA8: u32 = 0x8058;

    pub const R16: u32 = 0x822A;
    pub const RG16: u32 = 0x822C;
    pub const RGB16: u32 = 0x8054;
    pub const RGBA16: u32 = 0x805B;

    pub const R32F: u32 = 0x822E;
    pub const RG32F: u32 = 0x8230;
    pub const RGB32F: u32 = 0x8815;
    pub const RGBA32F: u32 = 0x8814;
}

/// Fixed header fields of the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureHeader {
    pub gl_type: u32,
    pub gl_type_size: u32,
    pub gl_format: u32,
    pub gl_internal_format: u32,
    pub gl_base_internal_format: u32,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub pixel_depth: u32,
    pub number_of_array_elements: u32,
    pub number_of_faces: u32,
    pub number_of_mipmap_levels: u32,
}

pub fn gl_type(element_type: ElementType) -> u32 {
    match element_type {
        ElementType::U8 => gl::UNSIGNED_BYTE,
        ElementType::U16 => gl::UNSIGNED_SHORT,
        ElementType::F32 => gl::FLOAT,
    }
}

pub fn element_type_from_gl(gl_type: u32) -> Result<ElementType> {
    match gl_type {
        gl::UNSIGNED_BYTE => Ok(ElementType::U8),
        gl::UNSIGNED_SHORT => Ok(ElementType::U16),
        gl::FLOAT => Ok(ElementType::F32),
        other => Err(ConversionError::UnsupportedType(format!(
            "GL type 0x{:04X}",
            other
        ))),
    }
}

/// Base format for a channel count of 1 to 4.
pub fn gl_format(channels: usize) -> Result<u32> {
    match channels {
        1 => Ok(gl::RED),
        2 => Ok(gl::RG),
        3 => Ok(gl::RGB),
        4 => Ok(gl::RGBA),
        other => Err(ConversionError::UnsupportedType(format!(
            "no texture format for {} channels",
            other
        ))),
    }
}

pub fn channels_from_gl_format(format: u32) -> Result<usize> {
    match format {
        gl::RED => Ok(1),
        gl::RG => Ok(2),
        gl::RGB => Ok(3),
        gl::RGBA => Ok(4),
        other => Err(ConversionError::UnsupportedType(format!(
            "GL format 0x{:04X}",
            other
        ))),
    }
}

pub fn gl_internal_format(channels: usize, element_type: ElementType) -> Result<u32> {
    let sized = match element_type {
        ElementType::U8 => [gl::R8, gl::RG8, gl::RGB8, gl::RGBA8],
        ElementType::U16 => [gl::R16, gl::RG16, gl::RGB16, gl::RGBA16],
        ElementType::F32 => [gl::R32F, gl::RG32F, gl::RGB32F, gl::RGBA32F],
    };
    gl_format(channels)?;
    Ok(sized[channels - 1])
}

fn to_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        ConversionError::InvalidConfig(format!("{} {} does not fit in 32 bits", what, value))
    })
}

impl TextureHeader {
    /// Header describing `chain`.
    ///
    /// Fails with `UnsupportedType` when the channel count has no format code.
    pub fn for_mip_chain(chain: &MipChain) -> Result<Self> {
        let channels = chain.channels();
        let element_type = chain.element_type();
        let format = gl_format(channels)?;
        let shape = chain.base().shape();

        Ok(Self {
            gl_type: gl_type(element_type),
            gl_type_size: element_type.size_bytes() as u32,
            gl_format: format,
            gl_internal_format: gl_internal_format(channels, element_type)?,
            gl_base_internal_format: format,
            pixel_width: to_u32(shape.width, "width")?,
            pixel_height: to_u32(shape.height, "height")?,
            pixel_depth: to_u32(shape.depth, "depth")?,
            number_of_array_elements: 0,
            number_of_faces: 1,
            number_of_mipmap_levels: to_u32(chain.len(), "mip level count")?,
        })
    }

    pub fn element_type(&self) -> Result<ElementType> {
        element_type_from_gl(self.gl_type)
    }

    pub fn channels(&self) -> Result<usize> {
        channels_from_gl_format(self.gl_format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture_pipeline::downsample::Filter;
    use crate::texture_pipeline::interleave::interleave_channels;
    use crate::texture_pipeline::mipmap::{MipLevels, build_mip_chain};
    use crate::texture_pipeline::volume::{Shape, Volume};

    fn chain_with_channels(channels: usize) -> MipChain {
        let shape = Shape::new(2, 4, 8);
        let volumes: Vec<Volume> = (0..channels)
            .map(|c| Volume::from_u16(shape, vec![c as u16; shape.voxel_count()]).unwrap())
            .collect();
        let combined = interleave_channels(&volumes).unwrap();
        build_mip_chain(combined, Filter::Maximum, MipLevels::Auto).unwrap()
    }

    #[test]
    fn test_two_channel_u16_header() {
        let header = TextureHeader::for_mip_chain(&chain_with_channels(2)).unwrap();
        assert_eq!(header.gl_type, gl::UNSIGNED_SHORT);
        assert_eq!(header.gl_type_size, 2);
        assert_eq!(header.gl_format, gl::RG);
        assert_eq!(header.gl_base_internal_format, gl::RG);
        assert_eq!(header.gl_internal_format, gl::RG16);
        assert_eq!(
            (header.pixel_width, header.pixel_height, header.pixel_depth),
            (8, 4, 2)
        );
        assert_eq!(header.number_of_faces, 1);
        assert_eq!(header.number_of_mipmap_levels, 4);
        assert_eq!(header.channels().unwrap(), 2);
        assert_eq!(header.element_type().unwrap(), ElementType::U16);
    }

    #[test]
    fn test_five_channels_are_unsupported() {
        let result = TextureHeader::for_mip_chain(&chain_with_channels(5));
        assert!(matches!(result, Err(ConversionError::UnsupportedType(_))));
    }

    #[test]
    fn test_internal_formats() {
        assert_eq!(gl_internal_format(1, ElementType::U8).unwrap(), gl::R8);
        assert_eq!(gl_internal_format(4, ElementType::F32).unwrap(), gl::RGBA32F);
        assert_eq!(gl_internal_format(3, ElementType::U16).unwrap(), gl::RGB16);
        assert!(gl_internal_format(0, ElementType::U8).is_err());
    }
}
