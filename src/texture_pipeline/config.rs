//! Conversion configuration types

use crate::texture_pipeline::common::error::Result;
use crate::texture_pipeline::container::types::{Endianness, PayloadCompression};
use crate::texture_pipeline::downsample::Filter;
use crate::texture_pipeline::mipmap::MipLevels;

/// Configuration for TIFF stack to texture container conversion
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Filter used for XY pre-downsampling and for every mip level
    pub filter: Filter,
    /// Halve X and Y before building the pyramid
    pub downsample_xy: bool,
    /// Map 16-bit channels to 8 bits
    pub rescale_intensity: bool,
    /// Pyramid depth
    pub mip_levels: MipLevels,
    /// Per-level payload compression
    pub compression: PayloadCompression,
    /// Byte order of every multi-byte field and sample
    pub endianness: Endianness,
    /// Whether to check loaded volume dimensions before conversion
    pub validate_dimensions: bool,
    /// Largest accepted extent along any axis
    pub max_dimension: Option<usize>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            filter: Filter::Maximum,
            downsample_xy: true,
            rescale_intensity: false,
            mip_levels: MipLevels::Auto,
            compression: PayloadCompression::None,
            endianness: Endianness::Little,
            validate_dimensions: true,
            max_dimension: Some(65536),
        }
    }
}

impl ConversionConfig {
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        self.filter.validate()
    }
}

/// Builder for ConversionConfig
#[derive(Default)]
pub struct ConversionConfigBuilder {
    filter: Option<Filter>,
    downsample_xy: Option<bool>,
    rescale_intensity: Option<bool>,
    mip_levels: Option<MipLevels>,
    compression: Option<PayloadCompression>,
    endianness: Option<Endianness>,
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<usize>>,
}

impl ConversionConfigBuilder {
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn downsample_xy(mut self, enable: bool) -> Self {
        self.downsample_xy = Some(enable);
        self
    }

    pub fn rescale_intensity(mut self, enable: bool) -> Self {
        self.rescale_intensity = Some(enable);
        self
    }

    pub fn mip_levels(mut self, levels: MipLevels) -> Self {
        self.mip_levels = Some(levels);
        self
    }

    pub fn compression(mut self, compression: PayloadCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = Some(endianness);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_dimension(mut self, max: Option<usize>) -> Self {
        self.max_dimension = Some(max);
        self
    }

    pub fn build(self) -> ConversionConfig {
        let default = ConversionConfig::default();
        ConversionConfig {
            filter: self.filter.unwrap_or(default.filter),
            downsample_xy: self.downsample_xy.unwrap_or(default.downsample_xy),
            rescale_intensity: self.rescale_intensity.unwrap_or(default.rescale_intensity),
            mip_levels: self.mip_levels.unwrap_or(default.mip_levels),
            compression: self.compression.unwrap_or(default.compression),
            endianness: self.endianness.unwrap_or(default.endianness),
            validate_dimensions: self
                .validate_dimensions
                .unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConversionConfig::default();
        assert_eq!(config.filter, Filter::Maximum);
        assert!(config.downsample_xy);
        assert!(!config.rescale_intensity);
        assert_eq!(config.mip_levels, MipLevels::Auto);
        assert_eq!(config.compression, PayloadCompression::None);
        assert_eq!(config.endianness, Endianness::Little);
    }

    #[test]
    fn test_config_builder() {
        let config = ConversionConfig::builder()
            .filter(Filter::Mean)
            .downsample_xy(false)
            .rescale_intensity(true)
            .mip_levels(MipLevels::Count(3))
            .compression(PayloadCompression::Deflate)
            .endianness(Endianness::Big)
            .validate_dimensions(false)
            .max_dimension(None)
            .build();

        assert_eq!(config.filter, Filter::Mean);
        assert!(!config.downsample_xy);
        assert!(config.rescale_intensity);
        assert_eq!(config.mip_levels, MipLevels::Count(3));
        assert_eq!(config.compression, PayloadCompression::Deflate);
        assert_eq!(config.endianness, Endianness::Big);
        assert!(!config.validate_dimensions);
        assert_eq!(config.max_dimension, None);
    }

    #[test]
    fn test_zero_mip_levels_means_auto() {
        let config = ConversionConfig::builder()
            .mip_levels(MipLevels::from(0))
            .build();
        assert_eq!(config.mip_levels, MipLevels::Auto);
    }
}
