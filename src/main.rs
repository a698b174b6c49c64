use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use ktx_volume_rs::logger;
use ktx_volume_rs::texture_pipeline::{
    ConversionConfig, Endianness, Filter, MetadataMap, MipLevels, PayloadCompression,
    PipelineTimings, Provenance, TiffToKtxPipeline, downsample::DEFAULT_BLEND_WEIGHT,
};

/// Convert TIFF channel stacks into a mipmapped volume texture container
#[derive(Parser)]
#[command(name = "ktx_volume")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert explicit channel files, one TIFF stack per channel
    Channels {
        /// Channel files, in channel order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output container path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        options: PipelineOptions,
    },

    /// Convert an octree block folder holding transform.txt and default.*.tif
    Octree {
        /// Block folder
        folder: PathBuf,

        /// Output container path
        #[arg(short, long)]
        output: PathBuf,

        /// Depth of this block in the octree
        #[arg(short, long, default_value_t = 0)]
        level: i32,

        #[command(flatten)]
        options: PipelineOptions,
    },
}

#[derive(Args)]
struct PipelineOptions {
    /// Reduction filter for XY downsampling and mip levels
    #[arg(long, default_value = "max", value_parser = ["min", "max", "mean", "blended"])]
    filter: String,

    /// Weight toward the block maximum for the blended filter
    #[arg(long, default_value_t = DEFAULT_BLEND_WEIGHT)]
    blend_weight: f64,

    /// Keep the full XY resolution at mip level 0
    #[arg(long)]
    no_downsample_xy: bool,

    /// Map 16-bit channels to 8 bits
    #[arg(long)]
    rescale_intensity: bool,

    /// Number of mip levels, 0 for a full pyramid
    #[arg(long, default_value_t = 0)]
    mip_levels: usize,

    /// Deflate each mip level payload
    #[arg(long)]
    compress: bool,

    /// Write big-endian fields and samples
    #[arg(long)]
    big_endian: bool,

    /// Reject inputs with any axis longer than this
    #[arg(long)]
    max_dimension: Option<usize>,
}

impl PipelineOptions {
    fn filter(&self) -> anyhow::Result<Filter> {
        Ok(match self.filter.as_str() {
            "min" => Filter::Minimum,
            "max" => Filter::Maximum,
            "mean" => Filter::Mean,
            "blended" => Filter::Blended {
                weight: self.blend_weight,
            },
            other => bail!("unknown filter '{}'", other),
        })
    }

    fn to_config(&self) -> anyhow::Result<ConversionConfig> {
        let defaults = ConversionConfig::default();
        Ok(ConversionConfig::builder()
            .filter(self.filter()?)
            .downsample_xy(!self.no_downsample_xy)
            .rescale_intensity(self.rescale_intensity)
            .mip_levels(MipLevels::from(self.mip_levels))
            .compression(if self.compress {
                PayloadCompression::Deflate
            } else {
                PayloadCompression::None
            })
            .endianness(if self.big_endian {
                Endianness::Big
            } else {
                Endianness::Little
            })
            .max_dimension(self.max_dimension.or(defaults.max_dimension))
            .build())
    }
}

fn log_config(config: &ConversionConfig) {
    info!("Filter: {}", config.filter);
    info!(
        "XY downsampling: {}",
        if config.downsample_xy { "enabled" } else { "disabled" }
    );
    info!(
        "Intensity rescaling: {}",
        if config.rescale_intensity {
            "enabled"
        } else {
            "disabled"
        }
    );
    info!("Mip levels: {:?}", config.mip_levels);
    info!("Compression: {:?}", config.compression);
    info!("Endianness: {:?}", config.endianness);
}

fn run(cli: Cli) -> anyhow::Result<PipelineTimings> {
    match cli.command {
        Commands::Channels {
            inputs,
            output,
            options,
        } => {
            let config = options.to_config()?;
            let pipeline = TiffToKtxPipeline::new(config)?;
            log_config(pipeline.config());

            let specimen_id = output
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mut metadata = MetadataMap::new();
            Provenance::new(specimen_id, pipeline.config(), 0, None).insert_into(&mut metadata);

            pipeline
                .convert_files(&inputs, &output, metadata)
                .with_context(|| format!("converting channels into {}", output.display()))
        }
        Commands::Octree {
            folder,
            output,
            level,
            options,
        } => {
            let config = options.to_config()?;
            let pipeline = TiffToKtxPipeline::new(config)?;
            log_config(pipeline.config());

            pipeline
                .convert_octree_folder(&folder, &output, level)
                .with_context(|| format!("converting octree folder {}", folder.display()))
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_with_default(if cli.verbose { "debug" } else { logger::DEFAULT_FILTER });

    info!("Starting ktx_volume...");
    let timings = run(cli)?;
    info!(
        "Conversion successful in {:.3}s",
        timings.total_duration().as_secs_f64()
    );

    Ok(())
}
