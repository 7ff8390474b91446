use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use tracing::{debug, info, warn};

use crate::image_pipeline::{
    color::linear_to_srgb,
    common::error::{ConversionError, Result},
    conversions::types::WriteOptions,
    tensor::Image,
};

pub trait ImageWriter {
    fn write_image(&self, image: &Image, output: &mut dyn Write, options: &WriteOptions) -> Result<()>;
}

/// Writes linear float images as 8-bit sRGB PNG.
pub struct PngWriter;

impl ImageWriter for PngWriter {
    fn write_image(&self, image: &Image, output: &mut dyn Write, options: &WriteOptions) -> Result<()> {
        let buffer = encode_png(image, options)?;
        output.write_all(&buffer)?;
        Ok(())
    }
}

/// Normalizes, saturates, sRGB-encodes and PNG-encodes a batch-of-one image.
pub fn encode_png(image: &Image, options: &WriteOptions) -> Result<Vec<u8>> {
    let mut image = image.clone();
    if options.normalize {
        let max = image.max();
        if max > 0.0 && max.is_finite() {
            image = image.mapv(|v| v / max);
        } else {
            warn!("Cannot normalize image with maximum {}, writing as-is", max);
        }
    }
    if options.saturate {
        image = image.mapv(|v| v.min(1.0));
    }

    let rgb = image.promote_to_three_channels()?;
    let (height, width, _) = rgb.dim();
    debug!("Encoding PNG image: {}x{}", width, height);

    let pixels: Vec<u8> = rgb
        .iter()
        .map(|&v| (linear_to_srgb(v) * 255.0).round().clamp(0.0, 255.0) as u8)
        .collect();

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(&pixels, width as u32, height as u32, ExtendedColorType::Rgb8)
        .map_err(|e| ConversionError::EncodeError(e.to_string()))?;
    Ok(buffer)
}

pub fn write_image<P: AsRef<Path>>(image: &Image, output_path: P, options: &WriteOptions) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Writing {}", output_path.display());

    let buffer = encode_png(image, options)?;
    std::fs::write(output_path, &buffer).map_err(|e| {
        ConversionError::OutputWriteError(format!("{}: {}", output_path.display(), e))
    })
}

fn with_suffix(basename: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = basename.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Writes `{basename}_latest.png` and `{basename}_{sequence_num:08}.png`
/// with the same content and returns both paths.
pub fn write_sequential_image<P: AsRef<Path>>(
    image: &Image,
    basename: P,
    sequence_num: u32,
    options: &WriteOptions,
) -> Result<[PathBuf; 2]> {
    let basename = basename.as_ref();
    let latest = with_suffix(basename, "_latest.png");
    let numbered = with_suffix(basename, &format!("_{:08}.png", sequence_num));

    write_image(image, &latest, options)?;
    write_image(image, &numbered, options)?;
    Ok([latest, numbered])
}
