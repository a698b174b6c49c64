//! TIFF reading module
//!
//! Loads single-channel image stacks from disk into volumes.

mod reader;
mod tiff_stack_reader;

pub use reader::ChannelVolumeReader;
pub use tiff_stack_reader::TiffStackReader;
