use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::raw::types::RawFrame;

/// Decodes a raw file's bytes into an owned sensor plane plus metadata.
///
/// Implementations must not hand back anything borrowed from the decoder:
/// the returned frame outlives whatever handle produced it.
pub trait RawSensorReader {
    fn read_raw(&self, data: &[u8]) -> Result<RawFrame>;
}
