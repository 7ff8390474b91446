//! Floating-point image tensor shared by every pipeline stage.

use ndarray::{Array2, Array3, Array4, ArrayView3, Axis, s};

use crate::image_pipeline::common::error::{ConversionError, Result};

/// An image tensor with axes `[batch, height, width, channels]`.
///
/// Loaders always produce `batch == 1`. Channel count is 1 for mosaic or
/// greyscale data and 3 once demosaiced. Stages never mutate an `Image` in
/// place, they return a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    data: Array4<f32>,
}

impl Image {
    pub fn new(data: Array4<f32>) -> Self {
        Self { data }
    }

    /// Wraps a single `[height, width, channels]` image as a batch of one.
    pub fn from_single(data: Array3<f32>) -> Self {
        Self { data: data.insert_axis(Axis(0)) }
    }

    /// Wraps a bare sensor plane as `[1, height, width, 1]`.
    pub fn from_mosaic(plane: Array2<f32>) -> Self {
        Self { data: plane.insert_axis(Axis(0)).insert_axis(Axis(3)) }
    }

    pub fn zeros(batch: usize, height: usize, width: usize, channels: usize) -> Self {
        Self { data: Array4::zeros((batch, height, width, channels)) }
    }

    /// Stacks single images (each `batch == 1`) along the batch axis.
    pub fn stack(images: &[Image]) -> Result<Self> {
        let views = images
            .iter()
            .map(|image| image.single())
            .collect::<Result<Vec<_>>>()?;
        let data = ndarray::stack(Axis(0), &views)
            .map_err(|e| ConversionError::InvalidShape(format!("cannot stack images: {}", e)))?;
        Ok(Self { data })
    }

    pub fn batch(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn height(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn width(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    pub fn channels(&self) -> usize {
        self.data.len_of(Axis(3))
    }

    pub fn data(&self) -> &Array4<f32> {
        &self.data
    }

    pub fn into_data(self) -> Array4<f32> {
        self.data
    }

    /// The `[height, width, channels]` view of a batch-of-one image.
    pub fn single(&self) -> Result<ArrayView3<'_, f32>> {
        if self.batch() != 1 {
            return Err(ConversionError::InvalidShape(format!(
                "expected a single image, got a batch of {}",
                self.batch()
            )));
        }
        Ok(self.data.index_axis(Axis(0), 0))
    }

    pub fn batch_item(&self, index: usize) -> Option<Image> {
        (index < self.batch())
            .then(|| Image::from_single(self.data.index_axis(Axis(0), index).to_owned()))
    }

    pub fn max(&self) -> f32 {
        self.data.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    pub fn mapv(&self, f: impl Fn(f32) -> f32) -> Image {
        Image { data: self.data.mapv(f) }
    }

    /// Copies out `[y..y+height, x..x+width]` of every batch item and channel.
    pub fn crop(&self, x: usize, y: usize, width: usize, height: usize) -> Result<Image> {
        if x + width > self.width() || y + height > self.height() {
            return Err(ConversionError::InvalidDimensions(width, height));
        }
        Ok(Image {
            data: self.data.slice(s![.., y..y + height, x..x + width, ..]).to_owned(),
        })
    }

    /// Zero-fills `pad` pixels on every side of both spatial axes.
    pub fn pad(&self, pad: usize) -> Image {
        if pad == 0 {
            return self.clone();
        }
        let (batch, height, width, channels) = self.data.dim();
        let mut data = Array4::zeros((batch, height + 2 * pad, width + 2 * pad, channels));
        data.slice_mut(s![.., pad..pad + height, pad..pad + width, ..])
            .assign(&self.data);
        Image { data }
    }

    /// Returns a `[height, width, 3]` tensor, replicating a single channel.
    pub fn promote_to_three_channels(&self) -> Result<Array3<f32>> {
        let single = self.single()?;
        match single.len_of(Axis(2)) {
            3 => Ok(single.to_owned()),
            1 => {
                let plane = single.index_axis(Axis(2), 0);
                Ok(ndarray::stack(Axis(2), &[plane, plane, plane])
                    .map_err(|e| ConversionError::InvalidShape(e.to_string()))?)
            }
            n => Err(ConversionError::InvalidShape(format!(
                "cannot promote {} channels to RGB",
                n
            ))),
        }
    }
}
