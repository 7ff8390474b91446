use std::io::Cursor;

use bayer::{BayerDepth, CFA, Demosaic as BayerAlgorithm, RasterDepth, RasterMut};
use ndarray::Array4;
use tracing::info;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::debayer::types::Demosaic;
use crate::image_pipeline::tensor::Image;

const U16_SCALE: f32 = u16::MAX as f32;

/// Linear demosaic from the `bayer` crate.
///
/// The crate works on integer rasters, so the corrected mosaic is clamped to
/// [0, 1] and quantized to 16 bits on the way in. Use [`KernelDemosaic`]
/// when values outside that range must survive.
///
/// [`KernelDemosaic`]: crate::image_pipeline::debayer::KernelDemosaic
pub struct CpuDebayer;

impl CpuDebayer {
    pub fn new() -> Self {
        Self
    }

    fn process_plane(&self, plane: &[f32], width: usize, height: usize) -> Result<Vec<f32>> {
        let bayer_bytes: Vec<u8> = plane
            .iter()
            .flat_map(|&val| ((val.clamp(0.0, 1.0) * U16_SCALE).round() as u16).to_le_bytes())
            .collect();

        let bytes_per_pixel = 2;
        let output_buf_size = width * height * 3 * bytes_per_pixel;
        let mut output_buf = vec![0u8; output_buf_size];

        let mut cursor = Cursor::new(&bayer_bytes[..]);

        info!("Running demosaic with depth=Depth16LE, CFA=RGGB, algo=Linear");

        let mut output_raster = RasterMut::new(width, height, RasterDepth::Depth16, &mut output_buf);

        bayer::run_demosaic(
            &mut cursor,
            BayerDepth::Depth16LE,
            CFA::RGGB,
            BayerAlgorithm::Linear,
            &mut output_raster,
        )
        .map_err(|e| ConversionError::DemosaicError(format!("{:?}", e)))?;

        // The output raster stores samples in native byte order
        Ok(output_buf
            .chunks_exact(bytes_per_pixel)
            .map(|b| u16::from_ne_bytes([b[0], b[1]]) as f32 / U16_SCALE)
            .collect())
    }
}

impl Default for CpuDebayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Demosaic for CpuDebayer {
    fn demosaic(&self, mosaic: &Image) -> Result<Image> {
        if mosaic.channels() != 1 {
            return Err(ConversionError::InvalidShape(format!(
                "demosaic needs a single-channel mosaic, got {} channels",
                mosaic.channels()
            )));
        }
        let (batch, height, width) = (mosaic.batch(), mosaic.height(), mosaic.width());
        info!("Starting CPU debayering for image {}x{}", width, height);

        let mut rgb = Vec::with_capacity(batch * height * width * 3);
        for index in 0..batch {
            let item = mosaic
                .batch_item(index)
                .ok_or_else(|| ConversionError::InvalidShape("batch index out of range".into()))?;
            let plane: Vec<f32> = item.data().iter().copied().collect();
            rgb.extend(self.process_plane(&plane, width, height)?);
        }

        let data = Array4::from_shape_vec((batch, height, width, 3), rgb)
            .map_err(|e| ConversionError::InvalidShape(e.to_string()))?;
        Ok(Image::new(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_uniform_mosaic_stays_uniform() {
        let mosaic = Image::from_mosaic(Array2::from_elem((8, 8), 0.5f32));
        let rgb = CpuDebayer::new().demosaic(&mosaic).unwrap();
        assert_eq!(rgb.data().dim(), (1, 8, 8, 3));
        for &value in rgb.data().iter() {
            assert!((value - 0.5).abs() < 1e-3, "got {}", value);
        }
    }

    #[test]
    fn test_rejects_rgb_input() {
        let result = CpuDebayer::new().demosaic(&Image::zeros(1, 4, 4, 3));
        assert!(matches!(result, Err(ConversionError::InvalidShape(_))));
    }
}
