//! Conversion of one octree tile folder: `transform.txt` plus
//! `default.<channel>.tif` stacks.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::texture_pipeline::{
    common::error::{ConversionError, Result},
    container::{ContainerWriter, TextureContainer},
    conversions::tiff_to_ktx::TiffToKtxPipeline,
    metadata::{GeometryFacts, MetadataMap, Provenance, VolumeGeometry},
    tiff::ChannelVolumeReader,
    timing::PipelineTimings,
};

pub const TRANSFORM_FILE_NAME: &str = "transform.txt";
pub const CHANNEL_FILE_PATTERN: &str = "default.*.tif";

/// Channel files in `folder`, sorted by name so channel order is stable.
pub fn channel_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let folder_str = folder.to_str().ok_or_else(|| ConversionError::InputReadError {
        path: folder.to_path_buf(),
        message: "folder path is not valid UTF-8".to_string(),
    })?;
    let pattern = format!("{}/{}", glob::Pattern::escape(folder_str), CHANNEL_FILE_PATTERN);

    let entries = glob::glob(&pattern).map_err(|e| ConversionError::InputReadError {
        path: folder.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => files.push(path),
            Err(e) => warn!("Skipping unreadable entry: {}", e),
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(ConversionError::InputReadError {
            path: folder.to_path_buf(),
            message: format!("no files match {}", CHANNEL_FILE_PATTERN),
        });
    }
    Ok(files)
}

fn specimen_id(folder: &Path) -> String {
    folder
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl<R: ChannelVolumeReader, W: ContainerWriter> TiffToKtxPipeline<R, W> {
    /// Converts an octree tile folder into a container with geometry and
    /// provenance metadata. `level_id` is the tile's depth in the octree.
    #[instrument(
        skip(self, input_folder, output_path),
        fields(folder = %input_folder.as_ref().display())
    )]
    pub fn convert_octree_folder<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_folder: P,
        output_path: Q,
        level_id: i32,
    ) -> Result<PipelineTimings> {
        let folder = input_folder.as_ref();
        let output_path = output_path.as_ref();
        let mut timings = PipelineTimings::new();

        let facts = GeometryFacts::load(folder.join(TRANSFORM_FILE_NAME))?;
        let files = channel_files(folder)?;
        info!(channels = files.len(), "Found channel files");

        let channels = timings.time("load_channels", || self.load_channels(&files))?;
        let prepared = self.prepare_levels(channels, &mut timings)?;

        let mut metadata = MetadataMap::new();
        VolumeGeometry::compute(
            &facts,
            prepared.original_shape,
            prepared.mip_chain.base().shape(),
        )
        .insert_into(&mut metadata);
        Provenance::new(
            specimen_id(folder),
            self.config(),
            level_id,
            facts.total_levels,
        )
        .insert_into(&mut metadata);

        let container = TextureContainer::assemble(
            prepared.mip_chain,
            metadata,
            prepared.intensity_transforms,
        )?;
        timings.time("write_container", || self.write_file(&container, output_path))?;

        info!(output = %output_path.display(), "Octree folder converted");
        timings.log_summary();
        Ok(timings)
    }
}
