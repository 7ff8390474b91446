//! Decoding of already-developed images (TIFF, PNG, JPEG).
//!
//! TIFF goes through the `tiff` crate so 16-bit and float stacks keep their
//! precision; everything else goes through the `image` crate.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use ndarray::{Array3, Axis, s};
use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Decoded samples as code values, `[height, width, channels]`.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub samples: Array3<f32>,
    /// Full-scale value of the stored sample type (255, 65535, or 1.0 for float)
    pub sample_max: f32,
}

pub fn decode_standard(data: &[u8], format: ImageFormat) -> Result<DecodedImage> {
    match format {
        ImageFormat::Tiff => decode_tiff(data),
        other => decode_with_image(data, other),
    }
}

fn tiff_error(e: tiff::TiffError) -> ConversionError {
    ConversionError::DecodeError(e.to_string())
}

/// Decodes a TIFF, dropping any alpha channel.
pub fn decode_tiff(data: &[u8]) -> Result<DecodedImage> {
    let mut decoder = Decoder::new(Cursor::new(data)).map_err(tiff_error)?;
    let (width, height) = decoder.dimensions().map_err(tiff_error)?;
    let color = decoder.colortype().map_err(tiff_error)?;

    let (samples_per_pixel, keep) = match color {
        ColorType::Gray(_) => (1, 1),
        ColorType::GrayA(_) => (2, 1),
        ColorType::RGB(_) => (3, 3),
        ColorType::RGBA(_) => (4, 3),
        other => {
            return Err(ConversionError::UnsupportedFormat(format!("TIFF color type {:?}", other)));
        }
    };
    debug!("Decoding TIFF {}x{} {:?}", width, height, color);

    let (values, sample_max): (Vec<f32>, f32) = match decoder.read_image().map_err(tiff_error)? {
        DecodingResult::U8(v) => (v.into_iter().map(f32::from).collect(), u8::MAX as f32),
        DecodingResult::U16(v) => (v.into_iter().map(f32::from).collect(), u16::MAX as f32),
        DecodingResult::F32(v) => (v, 1.0),
        DecodingResult::F64(v) => (v.into_iter().map(|x| x as f32).collect(), 1.0),
        _ => {
            return Err(ConversionError::UnsupportedFormat("TIFF sample format".into()));
        }
    };

    let full = Array3::from_shape_vec((height as usize, width as usize, samples_per_pixel), values)
        .map_err(|e| ConversionError::DecodeError(e.to_string()))?;
    let samples = if keep == samples_per_pixel {
        full
    } else {
        full.slice(s![.., .., ..keep]).to_owned()
    };

    Ok(DecodedImage { samples, sample_max })
}

/// Decodes any format the `image` crate reads, as greyscale or RGB.
pub fn decode_with_image(data: &[u8], format: ImageFormat) -> Result<DecodedImage> {
    let decoded = image::load_from_memory_with_format(data, format)
        .map_err(|e| ConversionError::DecodeError(e.to_string()))?;
    let (width, height) = (decoded.width() as usize, decoded.height() as usize);
    let grey = !decoded.color().has_color();

    let (values, channels, sample_max): (Vec<f32>, usize, f32) = match &decoded {
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            (decoded.to_rgb32f().into_raw(), 3, 1.0)
        }
        DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_) => {
            let max = u16::MAX as f32;
            if grey {
                (decoded.to_luma16().into_raw().into_iter().map(f32::from).collect(), 1, max)
            } else {
                (decoded.to_rgb16().into_raw().into_iter().map(f32::from).collect(), 3, max)
            }
        }
        _ => {
            let max = u8::MAX as f32;
            if grey {
                (decoded.to_luma8().into_raw().into_iter().map(f32::from).collect(), 1, max)
            } else {
                (decoded.to_rgb8().into_raw().into_iter().map(f32::from).collect(), 3, max)
            }
        }
    };

    let samples = Array3::from_shape_vec((height, width, channels), values)
        .map_err(|e| ConversionError::DecodeError(e.to_string()))?;
    debug!("Decoded {:?} {}x{}x{}", format, width, height, samples.len_of(Axis(2)));
    Ok(DecodedImage { samples, sample_max })
}
