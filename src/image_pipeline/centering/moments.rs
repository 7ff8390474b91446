//! Intensity-weighted first moments.

use ndarray::{Array1, ArrayD, ArrayViewD, Axis, IxDyn};

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Centroid offsets from the geometric center, one row per spatial dimension.
///
/// Shape is `[leading.., num_spatial_dims, channels]`, where `leading` are any
/// axes in front of the spatial ones.
#[derive(Debug, Clone, PartialEq)]
pub struct CenterOfMass {
    offsets: ArrayD<f64>,
}

impl CenterOfMass {
    pub fn offsets(&self) -> &ArrayD<f64> {
        &self.offsets
    }

    /// The per-dimension offsets when there is exactly one centroid.
    pub fn as_vector(&self) -> Option<Vec<f64>> {
        let shape = self.offsets.shape();
        (shape.len() == 2 && shape[1] == 1).then(|| self.offsets.iter().copied().collect())
    }
}

/// Axis numbers of the spatial dimensions, width (`ndim - 2`) first.
pub fn spatial_axes(ndim: usize, num_spatial_dims: usize) -> Vec<usize> {
    (0..num_spatial_dims).map(|i| ndim - 2 - i).collect()
}

/// Sums over `axes`, highest axis first so the remaining numbers stay valid.
fn sum_axes(mut array: ArrayD<f64>, axes: &[usize]) -> ArrayD<f64> {
    let mut sorted = axes.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    for axis in sorted {
        array = array.sum_axis(Axis(axis));
    }
    array
}

/// Computes the center of mass of a channels-last image.
///
/// For a spatial axis of size `S` each sample is weighted by its position on
/// an evenly spaced ramp from `-S/2` to `+S/2`. With `collapse_channels` the
/// channels are summed into one intensity channel first.
pub fn center_of_mass(
    image: ArrayViewD<'_, f32>,
    num_spatial_dims: usize,
    collapse_channels: bool,
) -> Result<CenterOfMass> {
    let ndim = image.ndim();
    if num_spatial_dims == 0 || num_spatial_dims + 1 > ndim {
        return Err(ConversionError::InvalidShape(format!(
            "cannot take {} spatial dimensions of a rank {} image",
            num_spatial_dims, ndim
        )));
    }
    let channel_axis = Axis(ndim - 1);

    let mut image = image.mapv(f64::from);
    if collapse_channels {
        image = image.sum_axis(channel_axis).insert_axis(channel_axis);
    }

    let axes = spatial_axes(ndim, num_spatial_dims);
    let total_mass = sum_axes(image.clone(), &axes);
    if let Some(&bad) = total_mass.iter().find(|m| **m == 0.0 || !m.is_finite()) {
        return Err(ConversionError::DegenerateCentroid(bad));
    }

    let mut per_dim = Vec::with_capacity(axes.len());
    for &axis in &axes {
        let size = image.len_of(Axis(axis));
        let half = size as f64 / 2.0;

        let mut ramp_shape = vec![1; ndim];
        ramp_shape[axis] = size;
        let ramp = Array1::linspace(-half, half, size)
            .into_shape_with_order(IxDyn(&ramp_shape))
            .map_err(|e| ConversionError::InvalidShape(e.to_string()))?;

        let moments = sum_axes(&image * &ramp, &axes);
        per_dim.push(moments / &total_mass);
    }

    // Insert the dimension axis just before channels.
    let dim_axis = Axis(per_dim[0].ndim() - 1);
    let views: Vec<_> = per_dim.iter().map(|a| a.view()).collect();
    let offsets = ndarray::stack(dim_axis, &views)
        .map_err(|e| ConversionError::InvalidShape(e.to_string()))?;

    Ok(CenterOfMass { offsets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array3;

    #[test]
    fn test_single_pixel_centroid() {
        let mut image = Array3::<f32>::zeros((4, 4, 1));
        image[[0, 0, 0]] = 1.0;
        let com = center_of_mass(image.view().into_dyn(), 2, true).unwrap();
        assert_eq!(com.offsets().shape(), &[2, 1]);
        assert_eq!(com.as_vector(), Some(vec![-2.0, -2.0]));
    }

    #[test]
    fn test_width_comes_first() {
        let mut image = Array3::<f32>::zeros((5, 3, 1));
        image[[4, 1, 0]] = 3.0;
        let com = center_of_mass(image.view().into_dyn(), 2, true).unwrap().as_vector().unwrap();
        assert_abs_diff_eq!(com[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(com[1], 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_per_channel_without_collapse() {
        let mut image = Array3::<f32>::zeros((4, 4, 2));
        image[[0, 0, 0]] = 1.0;
        image[[3, 3, 1]] = 1.0;
        let com = center_of_mass(image.view().into_dyn(), 2, false).unwrap();
        assert_eq!(com.offsets().shape(), &[2, 2]);
        assert_abs_diff_eq!(com.offsets()[[0, 0]], -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(com.offsets()[[1, 1]], 2.0, epsilon = 1e-12);
        assert_eq!(com.as_vector(), None);
    }

    #[test]
    fn test_one_spatial_dim_keeps_rows() {
        let mut image = Array3::<f32>::zeros((2, 4, 1));
        image[[0, 0, 0]] = 1.0;
        image[[1, 3, 0]] = 1.0;
        let com = center_of_mass(image.view().into_dyn(), 1, true).unwrap();
        assert_eq!(com.offsets().shape(), &[2, 1, 1]);
        assert_abs_diff_eq!(com.offsets()[[0, 0, 0]], -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(com.offsets()[[1, 0, 0]], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_mass_is_degenerate() {
        let image = Array3::<f32>::zeros((4, 4, 3));
        let result = center_of_mass(image.view().into_dyn(), 2, true);
        assert!(matches!(result, Err(ConversionError::DegenerateCentroid(_))));
    }

    #[test]
    fn test_too_many_spatial_dims() {
        let image = Array3::<f32>::ones((4, 4, 1));
        let result = center_of_mass(image.view().into_dyn(), 3, true);
        assert!(matches!(result, Err(ConversionError::InvalidShape(_))));
    }
}
