//! Integer shifts, cyclic rolls and zero padding.

use ndarray::{ArrayD, ArrayViewD, Axis, Slice};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::tensor::Image;

/// Integer translation per spatial dimension, width first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftVector(pub Vec<isize>);

impl ShiftVector {
    /// The shift that moves a centroid at `offsets` onto the center.
    ///
    /// Offsets truncate toward zero. With `only_even` the low bit of each
    /// truncated offset is then cleared, so odd negative offsets move away
    /// from zero (-3 becomes -4).
    pub fn from_centroid(offsets: &[f64], only_even: bool) -> Self {
        Self(
            offsets
                .iter()
                .map(|&offset| {
                    let mut shift = offset.trunc() as isize;
                    if only_even {
                        shift &= -2;
                    }
                    -shift
                })
                .collect(),
        )
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&s| s == 0)
    }

    pub fn dx(&self) -> isize {
        self.0.first().copied().unwrap_or(0)
    }

    pub fn dy(&self) -> isize {
        self.0.get(1).copied().unwrap_or(0)
    }
}

/// Cyclically rolls `array` by `shift` along each `(axis, shift)` pair.
/// Samples pushed off one edge re-enter at the other.
pub fn roll(array: ArrayViewD<'_, f32>, shifts: &[(usize, isize)]) -> Result<ArrayD<f32>> {
    for &(axis, _) in shifts {
        if axis >= array.ndim() {
            return Err(ConversionError::InvalidShape(format!(
                "cannot roll axis {} of a rank {} array",
                axis,
                array.ndim()
            )));
        }
    }

    let mut result = array.to_owned();
    for &(axis, shift) in shifts {
        let len = result.len_of(Axis(axis));
        if len == 0 {
            continue;
        }
        let split = shift.rem_euclid(len as isize) as usize;
        if split == 0 {
            continue;
        }

        let mut rolled = ArrayD::zeros(result.raw_dim());
        rolled
            .slice_axis_mut(Axis(axis), Slice::from(split..))
            .assign(&result.slice_axis(Axis(axis), Slice::from(..len - split)));
        rolled
            .slice_axis_mut(Axis(axis), Slice::from(..split))
            .assign(&result.slice_axis(Axis(axis), Slice::from(len - split..)));
        result = rolled;
    }
    Ok(result)
}

/// Zero-fills `pad` pixels around the spatial axes.
pub fn pad_image(image: &Image, pad: usize) -> Image {
    image.pad(pad)
}
