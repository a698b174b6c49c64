use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to read input file {path}: {message}")]
    InputReadError { path: PathBuf, message: String },

    #[error("Failed to write output file {path}: {source}")]
    OutputWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode TIFF stack: {0}")]
    DecodeError(String),

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Channel shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Degenerate intensity statistics: {0}")]
    DegenerateStatistics(String),

    #[error("Invalid volume dimensions: depth={0}, height={1}, width={2}")]
    InvalidDimensions(usize, usize, usize),

    #[error("Sample buffer holds {actual} values, expected {expected}")]
    BufferLength { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("Malformed container: {0}")]
    MalformedContainer(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConversionError>;
