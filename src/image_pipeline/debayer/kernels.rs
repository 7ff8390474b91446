//! Kernel-table demosaicing.
//!
//! A table holds one square kernel per (Bayer phase, output channel). Phase
//! is `(row % 2) * 2 + col % 2`, so for RGGB phase 0 is a red site, 1 and 2
//! are green sites and 3 is a blue site.

use ndarray::{Array4, Axis};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::tensor::Image;

/// Number of Bayer phases in a 2×2 tile.
pub const PHASES: usize = 4;

/// Output channels produced by demosaicing.
pub const RGB_CHANNELS: usize = 3;

/// Demosaic kernels, shaped `[phase, channel, size, size]` with odd `size`.
#[derive(Debug, Clone, PartialEq)]
pub struct DemosaicKernels {
    weights: Array4<f32>,
}

impl DemosaicKernels {
    pub fn new(weights: Array4<f32>) -> Result<Self> {
        let (phases, channels, rows, cols) = weights.dim();
        if phases != PHASES || channels != RGB_CHANNELS || rows != cols || rows % 2 == 0 {
            return Err(ConversionError::InvalidShape(format!(
                "demosaic kernels must be [4, 3, k, k] with odd k, got {:?}",
                weights.shape()
            )));
        }
        Ok(Self { weights })
    }

    /// Bilinear interpolation for an RGGB sensor.
    pub fn bilinear_rggb() -> Self {
        const O: f32 = 0.0;
        const H: f32 = 0.5;
        const Q: f32 = 0.25;
        const CENTER: [[f32; 3]; 3] = [[O, O, O], [O, 1.0, O], [O, O, O]];
        const CROSS: [[f32; 3]; 3] = [[O, Q, O], [Q, O, Q], [O, Q, O]];
        const DIAGONAL: [[f32; 3]; 3] = [[Q, O, Q], [O, O, O], [Q, O, Q]];
        const HORIZONTAL: [[f32; 3]; 3] = [[O, O, O], [H, O, H], [O, O, O]];
        const VERTICAL: [[f32; 3]; 3] = [[O, H, O], [O, O, O], [O, H, O]];

        // [phase][channel], channels in R, G, B order
        let table = [
            [CENTER, CROSS, DIAGONAL],
            [HORIZONTAL, CENTER, VERTICAL],
            [VERTICAL, CENTER, HORIZONTAL],
            [DIAGONAL, CROSS, CENTER],
        ];
        Self {
            weights: Array4::from_shape_fn((PHASES, RGB_CHANNELS, 3, 3), |(p, ch, y, x)| {
                table[p][ch][y][x]
            }),
        }
    }

    pub fn size(&self) -> usize {
        self.weights.len_of(Axis(2))
    }

    pub fn weights(&self) -> &Array4<f32> {
        &self.weights
    }
}

/// Mirrors an out-of-range index without repeating the edge sample
/// (`-1 -> 1`, `n -> n - 2`), which keeps the Bayer parity of the neighbor.
fn reflect(index: isize, len: usize) -> usize {
    let last = len as isize - 1;
    let mirrored = if index < 0 {
        -index
    } else if index > last {
        2 * last - index
    } else {
        index
    };
    mirrored.clamp(0, last) as usize
}

/// Convolves a `[batch, H, W, 1]` mosaic with the kernel table.
pub fn apply_demosaic_filter(mosaic: &Image, kernels: &DemosaicKernels) -> Result<Image> {
    if mosaic.channels() != 1 {
        return Err(ConversionError::InvalidShape(format!(
            "demosaic needs a single-channel mosaic, got {} channels",
            mosaic.channels()
        )));
    }
    let (batch, height, width) = (mosaic.batch(), mosaic.height(), mosaic.width());
    if height == 0 || width == 0 {
        return Err(ConversionError::InvalidDimensions(width, height));
    }

    let plane = mosaic.data();
    let weights = kernels.weights();
    let size = kernels.size();
    let half = (size / 2) as isize;

    let data = Array4::from_shape_fn((batch, height, width, RGB_CHANNELS), |(b, row, col, ch)| {
        let phase = (row % 2) * 2 + col % 2;
        let mut sum = 0.0f32;
        for ky in 0..size {
            let y = reflect(row as isize + ky as isize - half, height);
            for kx in 0..size {
                let weight = weights[[phase, ch, ky, kx]];
                if weight != 0.0 {
                    let x = reflect(col as isize + kx as isize - half, width);
                    sum += weight * plane[[b, y, x, 0]];
                }
            }
        }
        sum
    });

    Ok(Image::new(data))
}
