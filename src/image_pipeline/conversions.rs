//! Pipeline conversions module
//!
//! Orchestrates file ingestion (raw or standard decode, crop, color
//! processing) and PNG output.

mod read_pipeline;
pub mod types;
mod writer;

#[cfg(test)]
mod tests;

pub use read_pipeline::{read_image, ReadPipeline};
pub use types::{ReadOptions, ReadOptionsBuilder, WriteOptions, WriteOptionsBuilder};
pub use writer::{encode_png, write_image, write_sequential_image, ImageWriter, PngWriter};
