use ndarray::{Array3, ArrayView3, Axis, Ix3};
use tracing::{debug, info, instrument};

use crate::image_pipeline::centering::moments::{center_of_mass, spatial_axes};
use crate::image_pipeline::centering::shift::{roll, ShiftVector};
use crate::image_pipeline::centering::types::CenterOptions;
use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::tensor::Image;

/// The shift that centers a single `[H, W, C]` image with all channels
/// summed, one component per `options.num_spatial_dims`. Spatial axes that
/// are not centered are summed away first.
pub fn center_shift(image: ArrayView3<'_, f32>, options: &CenterOptions) -> Result<ShiftVector> {
    let leading = (image.ndim() - 1).saturating_sub(options.num_spatial_dims);
    let mut profile = image.to_owned().into_dyn();
    for _ in 0..leading {
        profile = profile.sum_axis(Axis(0));
    }

    let com = center_of_mass(profile.view(), options.num_spatial_dims, true)?;
    let offsets = com
        .as_vector()
        .ok_or_else(|| ConversionError::InvalidShape("expected a single centroid".into()))?;
    Ok(ShiftVector::from_centroid(&offsets, options.only_even_shifts))
}

fn center_single(image: ArrayView3<'_, f32>, options: &CenterOptions) -> Result<Array3<f32>> {
    let shift = center_shift(image, options)?;
    debug!(dx = shift.dx(), dy = shift.dy(), "Centering shift");

    let axes = spatial_axes(image.ndim(), options.num_spatial_dims);
    let pairs: Vec<(usize, isize)> = axes.into_iter().zip(shift.0.iter().copied()).collect();
    roll(image.into_dyn(), &pairs)?
        .into_dimensionality::<Ix3>()
        .map_err(|e| ConversionError::InvalidShape(e.to_string()))
}

fn center_channels(padded: &Image, options: &CenterOptions) -> Result<Image> {
    let single = padded.single()?;
    let channels = single
        .axis_iter(Axis(2))
        .map(|plane| center_single(plane.insert_axis(Axis(2)), options))
        .collect::<Result<Vec<_>>>()?;

    let views: Vec<_> = channels.iter().map(|c| c.view()).collect();
    let data = ndarray::concatenate(Axis(2), &views)
        .map_err(|e| ConversionError::InvalidShape(e.to_string()))?;
    Ok(Image::from_single(data))
}

/// Pads a batch-of-one image, then rolls it so its center of mass sits on
/// the geometric center. With `collapse_channels` the channels are summed
/// to find the centroid and all of them move together; otherwise this is
/// [`center_image_per_channel`].
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn center_image(image: &Image, options: &CenterOptions) -> Result<Image> {
    let padded = image.pad(options.pad);
    if !options.collapse_channels {
        return center_channels(&padded, options);
    }
    let centered = center_single(padded.single()?, options)?;
    Ok(Image::from_single(centered))
}

/// Centers every channel on its own centroid.
#[instrument(skip(image), fields(channels = image.channels()))]
pub fn center_image_per_channel(image: &Image, options: &CenterOptions) -> Result<Image> {
    center_channels(&image.pad(options.pad), options)
}

/// Centers each image of a batch independently.
pub fn center_images(images: &Image, options: &CenterOptions) -> Result<Image> {
    info!(
        "Centering {} images of {}x{}x{}",
        images.batch(),
        images.height(),
        images.width(),
        images.channels()
    );
    let centered = (0..images.batch())
        .filter_map(|index| images.batch_item(index))
        .map(|image| center_image(&image, options))
        .collect::<Result<Vec<_>>>()?;
    Image::stack(&centered)
}
