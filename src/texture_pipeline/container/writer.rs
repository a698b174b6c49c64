use std::io::Write;

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use tracing::debug;

use crate::texture_pipeline::common::error::Result;
use crate::texture_pipeline::config::ConversionConfig;
use crate::texture_pipeline::container::types::{
    ENDIANNESS_MARKER, Endianness, IDENTIFIER, PayloadCompression, TextureContainer,
};
use crate::texture_pipeline::metadata::{MetadataMap, MetadataValue};
use crate::texture_pipeline::volume::VolumeData;

pub trait ContainerWriter {
    fn write_container(
        &self,
        container: &TextureContainer,
        output: &mut dyn Write,
        config: &ConversionConfig,
    ) -> Result<()>;
}

/// Validates, encodes the whole container in memory, then writes it in one go.
pub struct StandardContainerWriter;

impl ContainerWriter for StandardContainerWriter {
    fn write_container(
        &self,
        container: &TextureContainer,
        output: &mut dyn Write,
        config: &ConversionConfig,
    ) -> Result<()> {
        let buffer = encode_container(container, config.endianness, config.compression)?;
        output.write_all(&buffer)?;
        output.flush()?;
        debug!(bytes = buffer.len(), "Container written");
        Ok(())
    }
}

/// Serializes `container` to bytes. Nothing is produced unless the container validates.
pub fn encode_container(
    container: &TextureContainer,
    endianness: Endianness,
    compression: PayloadCompression,
) -> Result<Vec<u8>> {
    container.validate()?;
    match endianness {
        Endianness::Little => encode::<LittleEndian>(container, compression),
        Endianness::Big => encode::<BigEndian>(container, compression),
    }
}

fn encode<B: ByteOrder>(
    container: &TextureContainer,
    compression: PayloadCompression,
) -> Result<Vec<u8>> {
    let header = container.header();
    let mut out = Vec::new();

    out.write_all(&IDENTIFIER)?;
    out.write_u32::<B>(ENDIANNESS_MARKER)?;
    for field in [
        header.gl_type,
        header.gl_type_size,
        header.gl_format,
        header.gl_internal_format,
        header.gl_base_internal_format,
        header.pixel_width,
        header.pixel_height,
        header.pixel_depth,
        header.number_of_array_elements,
        header.number_of_faces,
        header.number_of_mipmap_levels,
        compression.code(),
    ] {
        out.write_u32::<B>(field)?;
    }

    write_metadata::<B>(&mut out, container.metadata())?;

    out.write_u32::<B>(container.intensity_transforms().len() as u32)?;
    for transform in container.intensity_transforms() {
        out.write_f64::<B>(transform.scale)?;
        out.write_f64::<B>(transform.offset)?;
    }

    for (index, level) in container.mip_chain().levels().iter().enumerate() {
        let payload = sample_bytes::<B>(level.data());
        let image_size = payload.len();
        let stored = match compression {
            PayloadCompression::None => payload,
            PayloadCompression::Deflate => deflate(&payload)?,
        };
        debug!(
            level = index,
            raw = image_size,
            stored = stored.len(),
            "Encoded mip level"
        );
        out.write_u64::<B>(image_size as u64)?;
        out.write_u64::<B>(stored.len() as u64)?;
        out.write_all(&stored)?;
    }

    Ok(out)
}

fn write_metadata<B: ByteOrder>(out: &mut Vec<u8>, metadata: &MetadataMap) -> Result<()> {
    out.write_u32::<B>(metadata.len() as u32)?;
    for (key, value) in metadata.iter() {
        out.write_u32::<B>(key.len() as u32)?;
        out.write_all(key.as_bytes())?;
        out.write_u8(value.tag())?;
        match value {
            MetadataValue::String(s) => {
                out.write_u32::<B>(s.len() as u32)?;
                out.write_all(s.as_bytes())?;
            }
            MetadataValue::I32(v) => out.write_i32::<B>(*v)?,
            MetadataValue::I64(v) => out.write_i64::<B>(*v)?,
            MetadataValue::F32(v) => out.write_f32::<B>(*v)?,
            MetadataValue::F64(v) => out.write_f64::<B>(*v)?,
            MetadataValue::F32Array(values) => {
                out.write_u32::<B>(values.len() as u32)?;
                for v in values {
                    out.write_f32::<B>(*v)?;
                }
            }
            MetadataValue::F64Array(values) => {
                out.write_u32::<B>(values.len() as u32)?;
                for v in values {
                    out.write_f64::<B>(*v)?;
                }
            }
            MetadataValue::Timestamp(t) => out.write_i64::<B>(t.timestamp_micros())?,
        }
    }
    Ok(())
}

/// Channel-interleaved samples in byte order `B`.
fn sample_bytes<B: ByteOrder>(data: &VolumeData) -> Vec<u8> {
    match data {
        VolumeData::U8(values) => values.clone(),
        VolumeData::U16(values) => {
            let mut bytes = vec![0u8; values.len() * 2];
            B::write_u16_into(values, &mut bytes);
            bytes
        }
        VolumeData::F32(values) => {
            let mut bytes = vec![0u8; values.len() * 4];
            B::write_f32_into(values, &mut bytes);
            bytes
        }
    }
}

fn deflate(payload: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(payload)?;
    Ok(encoder.finish()?)
}
