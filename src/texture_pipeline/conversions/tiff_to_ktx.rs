use std::io::Write;
use std::path::Path;

use tracing::{info, info_span, instrument};

use crate::texture_pipeline::{
    common::error::{ConversionError, Result},
    config::ConversionConfig,
    container::{ContainerWriter, StandardContainerWriter, TextureContainer},
    downsample::downsample_xy,
    interleave::interleave_channels,
    metadata::MetadataMap,
    mipmap::{MipChain, build_mip_chain},
    rescale::{IntensityTransform, rescale_to_u8},
    tiff::{ChannelVolumeReader, TiffStackReader},
    timing::PipelineTimings,
    volume::{Shape, Volume},
};

/// Output of the numeric stages, ready for metadata and assembly.
#[derive(Debug, Clone)]
pub struct PreparedLevels {
    pub mip_chain: MipChain,
    /// One per channel when intensity rescaling ran, otherwise empty
    pub intensity_transforms: Vec<IntensityTransform>,
    /// Channel shape as loaded, before any spatial downsampling
    pub original_shape: Shape,
}

pub struct TiffToKtxPipeline<R: ChannelVolumeReader, W: ContainerWriter> {
    reader: R,
    writer: W,
    config: ConversionConfig,
}

impl TiffToKtxPipeline<TiffStackReader, StandardContainerWriter> {
    pub fn new(config: ConversionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reader: TiffStackReader,
            writer: StandardContainerWriter,
            config,
        })
    }
}

impl<R: ChannelVolumeReader, W: ContainerWriter> TiffToKtxPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: ConversionConfig) -> Self {
        Self {
            reader,
            writer,
            config,
        }
    }

    fn validate_dimensions(&self, shape: Shape) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if let Some(max) = self.config.max_dimension
            && shape.max_dimension() > max
        {
            return Err(ConversionError::InvalidDimensions(
                shape.depth,
                shape.height,
                shape.width,
            ));
        }

        Ok(())
    }

    /// Reads and decodes each channel file in order.
    #[instrument(skip(self, paths), fields(channels = paths.len()))]
    pub fn load_channels<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<Volume>> {
        let mut channels = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let _span = info_span!("load_channel", path = %path.display()).entered();

            let bytes = std::fs::read(path).map_err(|e| ConversionError::InputReadError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            let volume = self.reader.read_volume(&bytes).map_err(|e| match e {
                ConversionError::DecodeError(message) => {
                    ConversionError::DecodeError(format!("{}: {}", path.display(), message))
                }
                other => other,
            })?;

            info!(
                shape = %volume.shape(),
                element_type = volume.element_type().name(),
                "Loaded channel"
            );
            channels.push(volume);
        }
        Ok(channels)
    }

    /// Downsamples, rescales, interleaves and builds the pyramid.
    pub fn prepare_levels(
        &self,
        channels: Vec<Volume>,
        timings: &mut PipelineTimings,
    ) -> Result<PreparedLevels> {
        let Some(first) = channels.first() else {
            return Err(ConversionError::InvalidConfig(
                "no channels to convert".to_string(),
            ));
        };
        let original_shape = first.shape();
        for channel in &channels {
            self.validate_dimensions(channel.shape())?;
        }

        let filter = self.config.filter;
        let mut channels = channels;

        if self.config.downsample_xy {
            let _span = info_span!("downsample_xy", %filter).entered();
            channels = timings.time("downsample_xy", || {
                channels
                    .iter()
                    .map(|channel| downsample_xy(channel, filter))
                    .collect::<Result<Vec<_>>>()
            })?;
        }

        let mut intensity_transforms = Vec::new();
        if self.config.rescale_intensity {
            let _span = info_span!("rescale_intensity").entered();
            let rescaled = timings.time("rescale_intensity", || {
                channels
                    .iter()
                    .map(rescale_to_u8)
                    .collect::<Result<Vec<_>>>()
            })?;
            channels = Vec::with_capacity(rescaled.len());
            for channel in rescaled {
                intensity_transforms.push(channel.transform);
                channels.push(channel.volume);
            }
        }

        let combined = {
            let _span = info_span!("interleave").entered();
            timings.time("interleave", || interleave_channels(&channels))?
        };
        drop(channels);

        let mip_chain = {
            let _span = info_span!("build_mipmaps").entered();
            timings.time("build_mipmaps", || {
                build_mip_chain(combined, filter, self.config.mip_levels)
            })?
        };

        info!(
            levels = mip_chain.len(),
            channels = mip_chain.channels(),
            base = %mip_chain.base().shape(),
            "Mip chain ready"
        );

        Ok(PreparedLevels {
            mip_chain,
            intensity_transforms,
            original_shape,
        })
    }

    /// Runs the numeric stages and assembles a container carrying `metadata`.
    pub fn build_container(
        &self,
        channels: Vec<Volume>,
        metadata: MetadataMap,
    ) -> Result<TextureContainer> {
        let mut timings = PipelineTimings::new();
        let prepared = self.prepare_levels(channels, &mut timings)?;
        TextureContainer::assemble(
            prepared.mip_chain,
            metadata,
            prepared.intensity_transforms,
        )
    }

    pub fn write(&self, container: &TextureContainer, output: &mut dyn Write) -> Result<()> {
        let _span = info_span!("write_container").entered();
        self.writer.write_container(container, output, &self.config)
    }

    /// Writes `container` to a temporary file next to `output_path`, then
    /// renames it into place. A failed write leaves no file behind.
    #[instrument(
        skip(self, container, output_path),
        fields(output = %output_path.as_ref().display())
    )]
    pub fn write_file<P: AsRef<Path>>(
        &self,
        container: &TextureContainer,
        output_path: P,
    ) -> Result<()> {
        let output_path = output_path.as_ref();
        let write_error = |source: std::io::Error| ConversionError::OutputWriteError {
            path: output_path.to_path_buf(),
            source,
        };

        let directory = output_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = tempfile::NamedTempFile::new_in(directory).map_err(write_error)?;

        self.write(container, temp.as_file_mut()).map_err(|e| match e {
            ConversionError::IoError(source) => write_error(source),
            other => other,
        })?;
        temp.as_file().sync_all().map_err(write_error)?;
        temp.persist(output_path).map_err(|e| write_error(e.error))?;
        Ok(())
    }

    /// Converts explicit channel files into one container at `output_path`.
    #[instrument(skip(self, inputs, output_path, metadata))]
    pub fn convert_files<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        inputs: &[P],
        output_path: Q,
        metadata: MetadataMap,
    ) -> Result<PipelineTimings> {
        let output_path = output_path.as_ref();
        info!(
            channels = inputs.len(),
            output = %output_path.display(),
            "Converting channel files"
        );

        let mut timings = PipelineTimings::new();
        let channels = timings.time("load_channels", || self.load_channels(inputs))?;
        let prepared = self.prepare_levels(channels, &mut timings)?;
        let container = TextureContainer::assemble(
            prepared.mip_chain,
            metadata,
            prepared.intensity_transforms,
        )?;
        timings.time("write_container", || self.write_file(&container, output_path))?;

        timings.log_summary();
        Ok(timings)
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ConversionConfig) {
        self.config = config;
    }
}
