//! Container metadata module
//!
//! The ordered key/value map carried in the container, plus the geometry and
//! provenance entries attached to octree blocks.

pub mod geometry;
pub mod provenance;
pub mod types;

pub use geometry::{GeometryFacts, VolumeGeometry};
pub use provenance::{PROGRAM_NAME, PROGRAM_VERSION, Provenance, relation_to_parent};
pub use types::{MetadataMap, MetadataValue};
