//! Line plots of 1-D response curves, for eyeballing sensor ADC functions.

use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, Axis};

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Renders `v` (values in [0, 1]) as an anti-aliased line, `[ysize, v.len()]`.
///
/// Row 0 is the value 1.0 and the last row is 0.0. `ysize` defaults to the
/// length of `v`.
pub fn vector_to_graph(v: ArrayView1<'_, f32>, ysize: Option<usize>, line_thickness: f32) -> Array2<f32> {
    let ysize = ysize.unwrap_or(v.len());
    let levels = Array1::linspace(1.0f32, 0.0, ysize);
    Array2::from_shape_fn((ysize, v.len()), |(y, x)| {
        let distance = (v[x] - levels[y]).abs() * ysize as f32;
        (line_thickness / 2.0 - distance + 1.0).clamp(0.0, 1.0)
    })
}

/// Plots every channel of an `[len, channels]` table, giving `[ysize, len, channels]`.
pub fn adc_function_to_graph(adc: ArrayView2<'_, f32>, ysize: Option<usize>, line_thickness: f32) -> Result<Array3<f32>> {
    let graphs: Vec<Array2<f32>> = adc
        .axis_iter(Axis(1))
        .map(|channel| vector_to_graph(channel, ysize, line_thickness))
        .collect();
    let views: Vec<_> = graphs.iter().map(|g| g.view()).collect();
    ndarray::stack(Axis(2), &views).map_err(|e| ConversionError::InvalidShape(e.to_string()))
}
