//! Pipeline conversions module
//!
//! Orchestrates the stages from channel files to a written container.

mod octree_folder;
mod tiff_to_ktx;


pub use octree_folder::{CHANNEL_FILE_PATTERN, TRANSFORM_FILE_NAME, channel_files};
pub use tiff_to_ktx::{PreparedLevels, TiffToKtxPipeline};
