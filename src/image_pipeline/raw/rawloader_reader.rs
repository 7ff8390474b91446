//! RAW image reader implementation using the rawloader library.
//!
//! This module supports the RAW formats rawloader can decode (CR2, ARW, NEF,
//! DNG, etc.). It copies the visible sensor plane out of the decoder's buffer
//! and extracts the Bayer layout, black levels and daylight white balance.

use std::io::Cursor;

use ndarray::Array2;
use rawloader::RawImageData as RawloaderImageData;
use tracing::{debug, warn};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::raw::reader::RawSensorReader;
use crate::image_pipeline::raw::types::{BayerPattern, CfaColor, RawFrame, RawMetadata};

/// RAW image reader that uses the rawloader library for decoding.
pub struct RawLoaderReader;

/// Default bit depth when no white level information is available from the RAW file.
const DEFAULT_BITS_PER_SAMPLE: u32 = 16;

/// The bit width of the u16 data type, used for calculating actual bits per sample.
const U16_BITS: u32 = 16;

impl RawSensorReader for RawLoaderReader {
    /// Decodes a RAW file and returns an owned copy of its visible area.
    ///
    /// The decoded rawloader image is dropped before this returns; nothing in
    /// the `RawFrame` borrows from it.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use stackprep_rs::image_pipeline::{RawLoaderReader, RawSensorReader};
    ///
    /// let raw_bytes = std::fs::read("light_0001.cr2").unwrap();
    /// let frame = RawLoaderReader.read_raw(&raw_bytes).unwrap();
    /// println!("{}x{} {}", frame.width(), frame.height(), frame.metadata.pattern);
    /// ```
    fn read_raw(&self, data: &[u8]) -> Result<RawFrame> {
        debug!("Decoding RAW image, {} bytes", data.len());

        let decoded = rawloader::decode(&mut Cursor::new(data))
            .map_err(|e| ConversionError::DecodeError(e.to_string()))?;

        if decoded.cpp != 1 {
            return Err(ConversionError::UnsupportedFormat(format!(
                "RAW file holds {} components per pixel, expected a single-channel mosaic",
                decoded.cpp
            )));
        }

        debug!(
            "Decoded {} {}: {}x{}, crops {:?}",
            decoded.clean_make, decoded.clean_model, decoded.width, decoded.height, decoded.crops
        );

        let plane = copy_visible_plane(&decoded)?;
        let metadata = extract_metadata(&decoded)?;

        debug!(
            "Visible plane {}x{}, pattern {}, {} bits per sample",
            plane.ncols(),
            plane.nrows(),
            metadata.pattern,
            metadata.bits_per_sample
        );

        Ok(RawFrame { plane, metadata })
    }
}

/// Copies the area inside the decoder's crop rectangle into owned memory.
fn copy_visible_plane(decoded: &rawloader::RawImage) -> Result<Array2<u16>> {
    let [top, right, bottom, left] = decoded.crops;
    let width = decoded.width.saturating_sub(left + right);
    let height = decoded.height.saturating_sub(top + bottom);
    if width == 0 || height == 0 {
        return Err(ConversionError::InvalidDimensions(width, height));
    }

    let stride = decoded.width;
    let plane = match &decoded.data {
        RawloaderImageData::Integer(values) => {
            Array2::from_shape_fn((height, width), |(row, col)| {
                values[(top + row) * stride + left + col]
            })
        }
        // Float data is normalized 0.0-1.0; scale it to the u16 range
        RawloaderImageData::Float(values) => {
            Array2::from_shape_fn((height, width), |(row, col)| {
                (values[(top + row) * stride + left + col] * u16::MAX as f32) as u16
            })
        }
    };
    Ok(plane)
}

fn extract_metadata(decoded: &rawloader::RawImage) -> Result<RawMetadata> {
    let [top, _, _, left] = decoded.crops;

    let color = |row: usize, col: usize| {
        let index = decoded.cfa.color_at(top + row, left + col);
        CfaColor::from_index(index).ok_or_else(|| {
            ConversionError::UnsupportedFormat(format!("unknown CFA color index {}", index))
        })
    };
    let pattern = BayerPattern::new([
        [color(0, 0)?, color(0, 1)?],
        [color(1, 0)?, color(1, 1)?],
    ]);

    // The white level is the largest value the sensor can produce, which
    // gives the actual bit depth (4095 -> 12 bits, 16383 -> 14 bits).
    let max_white_level = decoded.whitelevels.iter().max().copied().unwrap_or(u16::MAX);
    let bits_per_sample = if max_white_level == 0 {
        DEFAULT_BITS_PER_SAMPLE
    } else {
        U16_BITS - max_white_level.leading_zeros()
    };

    let mut black_levels = [0.0f32; 4];
    for (level, &black) in black_levels.iter_mut().zip(decoded.blacklevels.iter()) {
        *level = black as f32;
    }

    Ok(RawMetadata {
        pattern,
        color_desc: decoded.cfa.name.clone(),
        black_levels,
        daylight_wb: daylight_white_balance(decoded),
        bits_per_sample,
    })
}

/// Daylight (D65-neutral) multipliers from the color matrix, falling back to
/// the as-shot coefficients and then to unity.
fn daylight_white_balance(decoded: &rawloader::RawImage) -> [f32; 3] {
    let normalized = |wb: [f32; 4]| {
        let green = wb[1];
        let rgb = [wb[0] / green, 1.0, wb[2] / green];
        rgb.iter().all(|v| v.is_finite() && *v > 0.0).then_some(rgb)
    };

    normalized(decoded.neutralwb())
        .or_else(|| normalized(decoded.wb_coeffs))
        .unwrap_or_else(|| {
            warn!("RAW file has no usable white balance, using unity multipliers");
            [1.0, 1.0, 1.0]
        })
}
