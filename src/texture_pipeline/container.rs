//! Texture container module
//!
//! The binary container: identifier, endianness marker, header fields,
//! tagged metadata records, per-channel intensity transforms, then one
//! (optionally compressed) payload per mip level.

mod reader;
pub mod types;
mod writer;


pub use reader::{DecodedContainer, read_container};
pub use types::{ENDIANNESS_MARKER, Endianness, IDENTIFIER, PayloadCompression, TextureContainer};
pub use writer::{ContainerWriter, StandardContainerWriter, encode_container};
