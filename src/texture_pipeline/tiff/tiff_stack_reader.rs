//! Multi-page TIFF channel reader built on the tiff crate.
//!
//! Each page of the file is one z-plane; all pages must share dimensions and
//! sample type. Grayscale 8-bit, 16-bit and 32-bit float samples are accepted.

use std::io::Cursor;

use ::tiff::ColorType;
use ::tiff::decoder::{Decoder, DecodingResult, Limits};
use tracing::debug;

use crate::texture_pipeline::common::error::{ConversionError, Result};
use crate::texture_pipeline::tiff::reader::ChannelVolumeReader;
use crate::texture_pipeline::volume::{Shape, Volume, VolumeData};

/// Reads a TIFF stack into a single-channel [`Volume`].
pub struct TiffStackReader;

fn decode_error(e: ::tiff::TiffError) -> ConversionError {
    ConversionError::DecodeError(e.to_string())
}

/// Appends one decoded page to `planes`, which takes the type of the first page.
fn append_page(planes: &mut Option<VolumeData>, page: DecodingResult, index: usize) -> Result<()> {
    let page = match page {
        DecodingResult::U8(values) => VolumeData::U8(values),
        DecodingResult::U16(values) => VolumeData::U16(values),
        DecodingResult::F32(values) => VolumeData::F32(values),
        _ => {
            return Err(ConversionError::UnsupportedType(format!(
                "page {} has a sample format other than uint8, uint16 or float32",
                index
            )));
        }
    };

    let Some(stack) = planes.as_mut() else {
        *planes = Some(page);
        return Ok(());
    };
    match (stack, page) {
        (VolumeData::U8(all), VolumeData::U8(values)) => all.extend(values),
        (VolumeData::U16(all), VolumeData::U16(values)) => all.extend(values),
        (VolumeData::F32(all), VolumeData::F32(values)) => all.extend(values),
        (stack, page) => {
            return Err(ConversionError::DecodeError(format!(
                "page {} is {}, earlier pages are {}",
                index,
                page.element_type().name(),
                stack.element_type().name()
            )));
        }
    }
    Ok(())
}

impl ChannelVolumeReader for TiffStackReader {
    fn read_volume(&self, data: &[u8]) -> Result<Volume> {
        debug!("Decoding TIFF stack, {} bytes", data.len());

        let mut decoder = Decoder::new(Cursor::new(data))
            .map_err(decode_error)?
            .with_limits(Limits::unlimited());

        let (width, height) = decoder.dimensions().map_err(decode_error)?;
        let mut planes = None;
        let mut depth = 0usize;

        loop {
            let page_dimensions = decoder.dimensions().map_err(decode_error)?;
            if page_dimensions != (width, height) {
                return Err(ConversionError::DecodeError(format!(
                    "page {} is {}x{}, first page is {}x{}",
                    depth, page_dimensions.0, page_dimensions.1, width, height
                )));
            }
            match decoder.colortype().map_err(decode_error)? {
                ColorType::Gray(_) => {}
                other => {
                    return Err(ConversionError::UnsupportedType(format!(
                        "page {} has color type {:?}, expected grayscale",
                        depth, other
                    )));
                }
            }

            let page = decoder.read_image().map_err(decode_error)?;
            append_page(&mut planes, page, depth)?;
            depth += 1;

            if !decoder.more_images() {
                break;
            }
            decoder.next_image().map_err(decode_error)?;
        }

        let shape = Shape::new(depth, height as usize, width as usize);
        debug!(%shape, "Decoded TIFF stack");

        let data = planes.ok_or_else(|| ConversionError::DecodeError("no pages".to_string()))?;
        Volume::new(shape, 1, data)
    }
}
