//! Specimen geometry: the `transform.txt` facts and the metadata derived from them.

use std::path::Path;

use tracing::debug;

use crate::texture_pipeline::common::error::{ConversionError, Result};
use crate::texture_pipeline::metadata::types::MetadataMap;
use crate::texture_pipeline::volume::Shape;

const MICROMETERS_PER_NANOMETER: f64 = 1.0 / 1000.0;

/// Per-specimen facts read from `key: value` lines, in nanometres.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryFacts {
    /// Corner of the corner voxel, x/y/z
    pub origin_nm: [f64; 3],
    /// Voxel spacing, x/y/z
    pub spacing_nm: [f64; 3],
    /// Number of levels in the specimen's multiscale hierarchy, if recorded
    pub total_levels: Option<i32>,
}

impl GeometryFacts {
    /// Parses `key: value` lines. Lines that do not split into exactly one
    /// key and one value are ignored, as are unknown keys.
    pub fn parse(text: &str) -> Result<Self> {
        let mut fields = std::collections::HashMap::new();
        for line in text.lines() {
            let parts: Vec<&str> = line.split(": ").collect();
            if let &[key, value] = parts.as_slice() {
                fields.insert(key.trim(), value.trim());
            }
        }

        let number = |key: &str| -> Result<f64> {
            let raw = fields.get(key).ok_or_else(|| {
                ConversionError::InvalidMetadata(format!("missing geometry key '{}'", key))
            })?;
            raw.parse::<f64>().map_err(|e| {
                ConversionError::InvalidMetadata(format!("geometry key '{}': {}", key, e))
            })
        };

        let total_levels = match fields.get("nl") {
            Some(raw) => Some(raw.parse::<i32>().map_err(|e| {
                ConversionError::InvalidMetadata(format!("geometry key 'nl': {}", e))
            })?),
            None => None,
        };

        Ok(Self {
            origin_nm: [number("ox")?, number("oy")?, number("oz")?],
            spacing_nm: [number("sx")?, number("sy")?, number("sz")?],
            total_levels,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ConversionError::InputReadError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        debug!(path = %path.display(), "Parsing geometry facts");
        Self::parse(&text)
    }
}

/// World-space placement of one stored volume, in micrometres.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeGeometry {
    /// Row-major 4×4 map from texture coordinates to world xyz
    pub xyz_from_texcoord: [f32; 16],
    pub bounding_sphere_center: [f64; 3],
    pub bounding_sphere_radius: f64,
    /// RMS of the per-axis voxel size at the stored resolution
    pub nominal_resolution: f64,
}

impl VolumeGeometry {
    /// `original` is the shape before any spatial downsampling and fixes the
    /// physical extent; `stored` is the shape of mip level 0.
    pub fn compute(facts: &GeometryFacts, original: Shape, stored: Shape) -> Self {
        let [ox, oy, oz] = facts.origin_nm.map(|v| v * MICROMETERS_PER_NANOMETER);
        let [spx, spy, spz] = facts.spacing_nm.map(|v| v * MICROMETERS_PER_NANOMETER);
        let sx = original.width as f64 * spx;
        let sy = original.height as f64 * spy;
        let sz = original.depth as f64 * spz;

        #[rustfmt::skip]
        let xyz_from_texcoord = [
            sx, 0.0, 0.0, ox,
            0.0, sy, 0.0, oy,
            0.0, 0.0, sz, oz,
            0.0, 0.0, 0.0, 1.0,
        ]
        .map(|v| v as f32);

        let resolution = [
            sx / stored.width as f64,
            sy / stored.height as f64,
            sz / stored.depth as f64,
        ];
        let mean_square = resolution.iter().map(|r| r * r).sum::<f64>() / 3.0;

        Self {
            xyz_from_texcoord,
            bounding_sphere_center: [ox + 0.5 * sx, oy + 0.5 * sy, oz + 0.5 * sz],
            bounding_sphere_radius: 0.5 * (sx * sx + sy * sy + sz * sz).sqrt(),
            nominal_resolution: mean_square.sqrt(),
        }
    }

    pub fn insert_into(&self, map: &mut MetadataMap) {
        map.insert("distance_units", "micrometers");
        map.insert("xyz_from_texcoord_xform", self.xyz_from_texcoord.to_vec());
        map.insert(
            "bounding_sphere_center",
            self.bounding_sphere_center.to_vec(),
        );
        map.insert("bounding_sphere_radius", self.bounding_sphere_radius);
        map.insert("nominal_resolution", self.nominal_resolution);
    }
}
