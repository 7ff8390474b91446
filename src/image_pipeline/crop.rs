//! Centered, grid-aligned cropping shared by the raw and standard readers.

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Default crop alignment: one 2×2 Bayer tile.
pub const DEFAULT_CROP_ALIGN: usize = 2;

/// A crop rectangle in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl CropRegion {
    /// Centers a `width`×`height` window inside the source, snapping the origin
    /// down to a multiple of `align` so it stays on the Bayer tile grid.
    pub fn centered(
        source_width: usize,
        source_height: usize,
        width: usize,
        height: usize,
        align: usize,
    ) -> Result<Self> {
        if width > source_width || height > source_height {
            return Err(ConversionError::InvalidDimensions(width, height));
        }
        if align == 0 {
            return Err(ConversionError::InvalidShape("crop alignment must be at least 1".into()));
        }

        let x = ((source_width - width) / 2 / align) * align;
        let y = ((source_height - height) / 2 / align) * align;

        Ok(Self { x, y, width, height })
    }

    /// The no-op region covering the whole source.
    pub fn full(width: usize, height: usize) -> Self {
        Self { x: 0, y: 0, width, height }
    }
}

/// Resolves an optional `(width, height)` request against a source size.
pub fn crop_region(
    source_width: usize,
    source_height: usize,
    crop: Option<(usize, usize)>,
    align: usize,
) -> Result<CropRegion> {
    match crop {
        Some((width, height)) => CropRegion::centered(source_width, source_height, width, height, align),
        None => Ok(CropRegion::full(source_width, source_height)),
    }
}
