//! How a block was produced: source specimen, processing steps, and tool version.

use chrono::{DateTime, Utc};

use crate::texture_pipeline::config::ConversionConfig;
use crate::texture_pipeline::metadata::types::MetadataMap;

/// Name recorded as the creating program.
pub const PROGRAM_NAME: &str = env!("CARGO_PKG_NAME");

/// Version recorded alongside the program name.
pub const PROGRAM_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    pub specimen_id: String,
    pub mipmap_filter: String,
    pub relation_to_parent: String,
    pub multiscale_level_id: i32,
    pub multiscale_total_levels: Option<i32>,
    pub created: DateTime<Utc>,
}

impl Provenance {
    pub fn new(
        specimen_id: impl Into<String>,
        config: &ConversionConfig,
        level_id: i32,
        total_levels: Option<i32>,
    ) -> Self {
        Self {
            specimen_id: specimen_id.into(),
            mipmap_filter: config.filter.to_string(),
            relation_to_parent: relation_to_parent(config),
            multiscale_level_id: level_id,
            multiscale_total_levels: total_levels,
            created: Utc::now(),
        }
    }

    pub fn insert_into(&self, map: &mut MetadataMap) {
        map.insert("specimen_id", self.specimen_id.as_str());
        map.insert("mipmap_filter", self.mipmap_filter.as_str());
        map.insert("relation_to_parent", self.relation_to_parent.as_str());
        map.insert("multiscale_level_id", self.multiscale_level_id);
        if let Some(total) = self.multiscale_total_levels {
            map.insert("multiscale_total_levels", total);
        }
        map.insert("ktx_file_creation_date", self.created);
        map.insert("ktx_file_creation_program", PROGRAM_NAME);
        map.insert("ktx_volume_version", PROGRAM_VERSION);
    }
}

/// `;`-joined list of the processing steps applied to the source block.
pub fn relation_to_parent(config: &ConversionConfig) -> String {
    let mut relations = Vec::new();
    if config.downsample_xy {
        relations.push("downsampled 2X in X & Y");
    }
    if config.rescale_intensity {
        relations.push("rescaled intensity to 8 bits");
    }
    if relations.is_empty() {
        relations.push("unchanged");
    }
    relations.join(";")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture_pipeline::metadata::types::MetadataValue;

    #[test]
    fn test_relation_to_parent() {
        let both = ConversionConfig::builder()
            .downsample_xy(true)
            .rescale_intensity(true)
            .build();
        assert_eq!(
            relation_to_parent(&both),
            "downsampled 2X in X & Y;rescaled intensity to 8 bits"
        );

        let neither = ConversionConfig::builder()
            .downsample_xy(false)
            .rescale_intensity(false)
            .build();
        assert_eq!(relation_to_parent(&neither), "unchanged");
    }

    #[test]
    fn test_provenance_entries() {
        let provenance = Provenance::new("2015-06-19", &ConversionConfig::default(), 3, None);
        let mut map = MetadataMap::new();
        provenance.insert_into(&mut map);

        assert_eq!(map.get("multiscale_level_id"), Some(&MetadataValue::I32(3)));
        assert!(map.get("multiscale_total_levels").is_none());
        assert_eq!(
            map.get("mipmap_filter"),
            Some(&MetadataValue::String("max".to_string()))
        );
        assert!(matches!(
            map.get("ktx_file_creation_date"),
            Some(MetadataValue::Timestamp(_))
        ));
    }
}
