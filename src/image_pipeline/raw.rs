//! RAW image reading module
//!
//! This module provides format-agnostic RAW image reading capabilities: the
//! visible sensor plane plus the metadata needed to color-correct it.

mod reader;
mod rawloader_reader;
pub mod types;

pub use reader::RawSensorReader;
pub use rawloader_reader::RawLoaderReader;
pub use types::{BayerPattern, BayerTile, CfaColor, RawFrame, RawMetadata};
