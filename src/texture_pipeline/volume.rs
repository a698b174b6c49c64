//! Volume module
//!
//! In-memory 3-D sample arrays and the numeric traits the filters are written against.

pub mod sample;
pub mod types;

pub use sample::Sample;
pub use types::{ElementType, Shape, Volume, VolumeData};
