//! Parses container bytes back into a [`TextureContainer`].

use std::io::Read;
use std::marker::PhantomData;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use chrono::DateTime;
use flate2::read::ZlibDecoder;

use crate::texture_pipeline::common::error::{ConversionError, Result};
use crate::texture_pipeline::container::types::{
    Endianness, IDENTIFIER, PayloadCompression, TextureContainer,
};
use crate::texture_pipeline::header::{
    TextureHeader, channels_from_gl_format, element_type_from_gl,
};
use crate::texture_pipeline::metadata::{MetadataMap, MetadataValue};
use crate::texture_pipeline::mipmap::{MipChain, mip_dimension};
use crate::texture_pipeline::rescale::IntensityTransform;
use crate::texture_pipeline::volume::{ElementType, Shape, Volume, VolumeData};

/// A parsed container together with how it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedContainer {
    pub container: TextureContainer,
    pub endianness: Endianness,
    pub compression: PayloadCompression,
}

pub fn read_container(bytes: &[u8]) -> Result<DecodedContainer> {
    if bytes.len() < IDENTIFIER.len() + 4 || bytes[..IDENTIFIER.len()] != IDENTIFIER {
        return Err(malformed("missing file identifier"));
    }
    let marker = &bytes[IDENTIFIER.len()..IDENTIFIER.len() + 4];
    let body = &bytes[IDENTIFIER.len() + 4..];
    match marker {
        [0x01, 0x02, 0x03, 0x04] => decode(Cursor::<LittleEndian>::new(body), Endianness::Little),
        [0x04, 0x03, 0x02, 0x01] => decode(Cursor::<BigEndian>::new(body), Endianness::Big),
        other => Err(malformed(&format!("bad endianness marker {:02X?}", other))),
    }
}

fn malformed(message: &str) -> ConversionError {
    ConversionError::MalformedContainer(message.to_string())
}

/// Bounds-checked reader over a byte slice in byte order `B`.
struct Cursor<'a, B> {
    bytes: &'a [u8],
    position: usize,
    order: PhantomData<B>,
}

impl<'a, B: ByteOrder> Cursor<'a, B> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            position: 0,
            order: PhantomData,
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.bytes.len() - self.position;
        if len > remaining {
            return Err(malformed(&format!(
                "truncated at byte {}: wanted {}, {} left",
                self.position, len, remaining
            )));
        }
        let slice = &self.bytes[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(B::read_u32(self.take(4)?))
    }

    fn u64(&mut self) -> Result<u64> {
        Ok(B::read_u64(self.take(8)?))
    }

    fn i32(&mut self) -> Result<i32> {
        Ok(B::read_i32(self.take(4)?))
    }

    fn i64(&mut self) -> Result<i64> {
        Ok(B::read_i64(self.take(8)?))
    }

    fn f32(&mut self) -> Result<f32> {
        Ok(B::read_f32(self.take(4)?))
    }

    fn f64(&mut self) -> Result<f64> {
        Ok(B::read_f64(self.take(8)?))
    }

    fn length(&mut self) -> Result<usize> {
        Ok(self.u32()? as usize)
    }

    fn string(&mut self) -> Result<String> {
        let len = self.length()?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| malformed(&format!("invalid UTF-8: {}", e)))
    }

    fn f32_array(&mut self) -> Result<Vec<f32>> {
        let count = self.length()?;
        let bytes = self.take(count.saturating_mul(4))?;
        let mut values = vec![0f32; count];
        B::read_f32_into(bytes, &mut values);
        Ok(values)
    }

    fn f64_array(&mut self) -> Result<Vec<f64>> {
        let count = self.length()?;
        let bytes = self.take(count.saturating_mul(8))?;
        let mut values = vec![0f64; count];
        B::read_f64_into(bytes, &mut values);
        Ok(values)
    }

    fn is_empty(&self) -> bool {
        self.position == self.bytes.len()
    }
}

fn decode<B: ByteOrder>(
    mut cursor: Cursor<'_, B>,
    endianness: Endianness,
) -> Result<DecodedContainer> {
    let header = TextureHeader {
        gl_type: cursor.u32()?,
        gl_type_size: cursor.u32()?,
        gl_format: cursor.u32()?,
        gl_internal_format: cursor.u32()?,
        gl_base_internal_format: cursor.u32()?,
        pixel_width: cursor.u32()?,
        pixel_height: cursor.u32()?,
        pixel_depth: cursor.u32()?,
        number_of_array_elements: cursor.u32()?,
        number_of_faces: cursor.u32()?,
        number_of_mipmap_levels: cursor.u32()?,
    };
    let compression = PayloadCompression::from_code(cursor.u32()?)?;
    let element_type = element_type_from_gl(header.gl_type)?;
    let channels = channels_from_gl_format(header.gl_format)?;

    let metadata = read_metadata(&mut cursor)?;

    let transform_count = cursor.length()?;
    let mut intensity_transforms = Vec::new();
    for _ in 0..transform_count {
        intensity_transforms.push(IntensityTransform {
            scale: cursor.f64()?,
            offset: cursor.f64()?,
        });
    }

    let mut shape = Shape::new(
        header.pixel_depth as usize,
        header.pixel_height as usize,
        header.pixel_width as usize,
    );
    let mut levels = Vec::new();
    for index in 0..header.number_of_mipmap_levels {
        if index > 0 {
            shape = mip_dimension(shape);
        }
        let image_size = cursor.u64()? as usize;
        let stored_size = cursor.u64()? as usize;
        let stored = cursor.take(stored_size)?;
        let payload = match compression {
            PayloadCompression::None => stored.to_vec(),
            PayloadCompression::Deflate => inflate(stored, image_size)?,
        };
        if payload.len() != image_size {
            return Err(malformed(&format!(
                "mip level {} holds {} bytes, header says {}",
                index,
                payload.len(),
                image_size
            )));
        }
        let data = samples::<B>(&payload, element_type)?;
        levels.push(Volume::new(shape, channels, data)?);
    }

    if !cursor.is_empty() {
        return Err(malformed("trailing bytes after last mip level"));
    }

    let container =
        TextureContainer::assemble(MipChain::new(levels)?, metadata, intensity_transforms)?;
    if *container.header() != header {
        return Err(malformed("header fields disagree with the stored levels"));
    }

    Ok(DecodedContainer {
        container,
        endianness,
        compression,
    })
}

fn read_metadata<B: ByteOrder>(cursor: &mut Cursor<'_, B>) -> Result<MetadataMap> {
    let count = cursor.length()?;
    let mut metadata = MetadataMap::new();
    for _ in 0..count {
        let key = cursor.string()?;
        let value = match cursor.u8()? {
            1 => MetadataValue::String(cursor.string()?),
            2 => MetadataValue::I32(cursor.i32()?),
            3 => MetadataValue::I64(cursor.i64()?),
            4 => MetadataValue::F32(cursor.f32()?),
            5 => MetadataValue::F64(cursor.f64()?),
            6 => MetadataValue::F32Array(cursor.f32_array()?),
            7 => MetadataValue::F64Array(cursor.f64_array()?),
            8 => {
                let micros = cursor.i64()?;
                let timestamp = DateTime::from_timestamp_micros(micros)
                    .ok_or_else(|| malformed(&format!("timestamp {} out of range", micros)))?;
                MetadataValue::Timestamp(timestamp)
            }
            tag => return Err(malformed(&format!("unknown value tag {} for '{}'", tag, key))),
        };
        if metadata.insert(key.clone(), value).is_some() {
            return Err(malformed(&format!("duplicate metadata key '{}'", key)));
        }
    }
    Ok(metadata)
}

/// Inflates at most `image_size + 1` bytes, so an oversized stream is
/// rejected without decompressing all of it.
fn inflate(stored: &[u8], image_size: usize) -> Result<Vec<u8>> {
    let mut payload = Vec::new();
    ZlibDecoder::new(stored)
        .take(image_size as u64 + 1)
        .read_to_end(&mut payload)
        .map_err(|e| malformed(&format!("corrupt compressed payload: {}", e)))?;
    if payload.len() > image_size {
        return Err(malformed(&format!(
            "compressed payload inflates past {} bytes",
            image_size
        )));
    }
    Ok(payload)
}

fn samples<B: ByteOrder>(payload: &[u8], element_type: ElementType) -> Result<VolumeData> {
    if payload.len() % element_type.size_bytes() != 0 {
        return Err(malformed("payload is not a whole number of samples"));
    }
    let count = payload.len() / element_type.size_bytes();
    Ok(match element_type {
        ElementType::U8 => VolumeData::U8(payload.to_vec()),
        ElementType::U16 => {
            let mut values = vec![0u16; count];
            B::read_u16_into(payload, &mut values);
            VolumeData::U16(values)
        }
        ElementType::F32 => {
            let mut values = vec![0f32; count];
            B::read_f32_into(payload, &mut values);
            VolumeData::F32(values)
        }
    })
}
