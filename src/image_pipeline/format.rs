//! Source format detection from file extensions.

use std::path::Path;

use image::ImageFormat;

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Extensions routed to the raw sensor path (compared case-insensitively).
pub const RAW_EXTENSIONS: &[&str] = &[
    "cr2", "crw", "nef", "nrw", "arw", "srf", "sr2", "dng", "raf", "orf", "rw2", "pef", "srw",
    "3fr", "erf", "kdc", "dcr", "mef", "mos", "mrw", "iiq",
];

/// How a file's pixels are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Bayer mosaic from a camera raw file
    Raw,
    /// Already-developed image decoded by a standard codec
    StandardImage(ImageFormat),
}

impl SourceFormat {
    /// Picks the path for `path` once, from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| {
                ConversionError::UnsupportedFormat(format!("{} has no file extension", path.display()))
            })?;

        if RAW_EXTENSIONS.contains(&extension.as_str()) {
            return Ok(Self::Raw);
        }

        ImageFormat::from_extension(&extension)
            .filter(|format| format.reading_enabled())
            .map(Self::StandardImage)
            .ok_or_else(|| ConversionError::UnsupportedFormat(format!(".{} ({})", extension, path.display())))
    }
}
