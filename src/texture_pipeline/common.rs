//! Common utilities module
//!
//! This module contains shared utilities used across the texture pipeline.

pub mod error;

pub use error::{ConversionError, Result};
