//! Black-level subtraction and white-balance scaling per 2×2 Bayer tile.

use ndarray::Array;
use tracing::{debug, warn};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::raw::types::{BayerTile, RawMetadata};
use crate::image_pipeline::tensor::Image;

/// Applies `(value - black[r % 2][c % 2]) * scale[r % 2][c % 2]` to a mosaic.
///
/// The image is viewed as a grid of 2×2 tiles and the two tiles are
/// broadcast across it, so height and width must both be even.
pub fn apply_color_correction(image: &Image, scale: &BayerTile, black: &BayerTile) -> Result<Image> {
    if image.channels() != 1 {
        return Err(ConversionError::InvalidShape(format!(
            "color correction needs a single-channel mosaic, got {} channels",
            image.channels()
        )));
    }
    let (batch, height, width) = (image.batch(), image.height(), image.width());
    if height % 2 != 0 || width % 2 != 0 || height == 0 || width == 0 {
        return Err(ConversionError::InvalidDimensions(width, height));
    }

    debug!(?scale, ?black, "Applying color correction to {}x{} mosaic", width, height);

    let tiles = image
        .data()
        .as_standard_layout()
        .into_owned()
        .into_shape_with_order((batch, height / 2, 2, width / 2, 2))
        .map_err(|e| ConversionError::InvalidShape(e.to_string()))?;

    let black = tile_array(black)?;
    let scale = tile_array(scale)?;
    let corrected = (&tiles - &black) * &scale;

    let data = corrected
        .into_shape_with_order((batch, height, width, 1))
        .map_err(|e| ConversionError::InvalidShape(e.to_string()))?;
    Ok(Image::new(data))
}

/// A tile laid out so it broadcasts against `[batch, rows/2, 2, cols/2, 2]`.
fn tile_array(tile: &BayerTile) -> Result<ndarray::Array5<f32>> {
    let values = vec![tile.get(0, 0), tile.get(0, 1), tile.get(1, 0), tile.get(1, 1)];
    Array::from_shape_vec((1, 1, 2, 1, 2), values)
        .map_err(|e| ConversionError::InvalidShape(e.to_string()))
}

/// Warns when the sensor layout isn't the RGGB arrangement the demosaic
/// kernels assume. Processing carries on with the canonical kernels.
pub fn check_sensor_pattern(metadata: &RawMetadata) -> bool {
    let canonical = metadata.pattern.is_rggb();
    if !canonical {
        warn!(
            color_desc = %metadata.color_desc,
            pattern = %metadata.pattern,
            "Raw file has unexpected bayer pattern, colors may be wrong"
        );
    }
    canonical
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, array};

    #[test]
    fn test_unit_correction_is_identity() {
        let plane = Array2::from_elem((6, 8), 1234.0f32);
        let image = Image::from_mosaic(plane);
        let corrected =
            apply_color_correction(&image, &BayerTile::uniform(1.0), &BayerTile::uniform(0.0)).unwrap();
        assert_eq!(corrected, image);
    }

    #[test]
    fn test_formula_per_tile_position() {
        let plane = Array2::from_shape_fn((4, 4), |(r, c)| (r * 4 + c) as f32 + 100.0);
        let image = Image::from_mosaic(plane.clone());
        let scale = BayerTile([[2.0, 1.0], [1.0, 0.5]]);
        let black = BayerTile([[10.0, 20.0], [30.0, 40.0]]);

        let corrected = apply_color_correction(&image, &scale, &black).unwrap();
        for ((r, c), &value) in plane.indexed_iter() {
            let expected = (value - black.get(r, c)) * scale.get(r, c);
            assert_abs_diff_eq!(corrected.data()[[0, r, c, 0]], expected, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_odd_dimensions_rejected() {
        let image = Image::from_mosaic(Array2::zeros((3, 4)));
        let result = apply_color_correction(&image, &BayerTile::uniform(1.0), &BayerTile::uniform(0.0));
        assert!(matches!(result, Err(ConversionError::InvalidDimensions(4, 3))));
    }

    #[test]
    fn test_rgb_input_rejected() {
        let image = Image::zeros(1, 2, 2, 3);
        let result = apply_color_correction(&image, &BayerTile::uniform(1.0), &BayerTile::uniform(0.0));
        assert!(matches!(result, Err(ConversionError::InvalidShape(_))));
    }

    #[test]
    fn test_black_level_subtraction() {
        let image = Image::from_mosaic(array![[600.0, 612.0], [612.0, 700.0]]);
        let black = BayerTile([[512.0, 512.0], [512.0, 512.0]]);
        let corrected = apply_color_correction(&image, &BayerTile::uniform(1.0), &black).unwrap();
        assert_eq!(corrected.data()[[0, 0, 0, 0]], 88.0);
        assert_eq!(corrected.data()[[0, 1, 1, 0]], 188.0);
    }
}
