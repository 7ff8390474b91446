use std::path::Path;

use ndarray::s;
use tracing::{debug, info, instrument};

use crate::image_pipeline::{
    color::{apply_color_correction, check_sensor_pattern, srgb_to_linear},
    common::error::{ConversionError, Result},
    conversions::types::ReadOptions,
    crop::crop_region,
    debayer::{Demosaic, KernelDemosaic},
    format::SourceFormat,
    raw::{RawLoaderReader, RawSensorReader},
    standard::decode_standard,
    tensor::Image,
};

/// Reads raw or standard image files into `[1, H, W, C]` float tensors.
pub struct ReadPipeline<R: RawSensorReader, D: Demosaic> {
    reader: R,
    demosaicer: D,
    options: ReadOptions,
}

impl ReadPipeline<RawLoaderReader, KernelDemosaic> {
    pub fn new(options: ReadOptions) -> Self {
        Self {
            reader: RawLoaderReader,
            demosaicer: KernelDemosaic::default(),
            options,
        }
    }
}

impl<R: RawSensorReader, D: Demosaic> ReadPipeline<R, D> {
    pub fn with_custom(reader: R, demosaicer: D, options: ReadOptions) -> Self {
        Self {
            reader,
            demosaicer,
            options,
        }
    }

    #[instrument(skip(self, input_path))]
    pub fn read_file<P: AsRef<Path>>(&self, input_path: P) -> Result<Image> {
        let input_path = input_path.as_ref();
        info!("Reading {}", input_path.display());

        let format = SourceFormat::from_path(input_path)?;

        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(input_path).map_err(|e| {
                ConversionError::InputReadError(format!("{}: {}", input_path.display(), e))
            })?
        };

        self.decode(&input_data, format)
    }

    pub fn decode(&self, input_data: &[u8], format: SourceFormat) -> Result<Image> {
        match format {
            SourceFormat::Raw => self.decode_raw(input_data),
            SourceFormat::StandardImage(image_format) => self.decode_standard(input_data, image_format),
        }
    }

    #[instrument(skip(self, input_data), fields(input_size = input_data.len()))]
    pub fn decode_raw(&self, input_data: &[u8]) -> Result<Image> {
        let options = &self.options;

        let frame = {
            let _span = tracing::info_span!("decode_raw").entered();
            self.reader.read_raw(input_data)?
        };

        let (mut image, metadata) = {
            let _span = tracing::info_span!("crop").entered();
            let region = crop_region(frame.width(), frame.height(), options.crop, options.crop_align)?;
            debug!(?region, "Cropping raw plane");

            let plane = frame
                .plane
                .slice(s![region.y..region.y + region.height, region.x..region.x + region.width])
                .mapv(f32::from);
            (Image::from_mosaic(plane), frame.metadata.cropped_at(region.x, region.y))
        };

        if !options.to_float {
            return Ok(image);
        }

        if options.color_balance || options.demosaic {
            check_sensor_pattern(&metadata);
        }

        if options.color_balance {
            let _span = tracing::info_span!("color_correction").entered();
            image = apply_color_correction(&image, &metadata.scale_tile(), &metadata.black_tile())?;
        }

        if options.demosaic {
            let _span = tracing::info_span!("demosaic").entered();
            image = self.demosaicer.demosaic(&image)?;
        }

        info!(
            width = image.width(),
            height = image.height(),
            channels = image.channels(),
            "Raw image ready"
        );
        Ok(image)
    }

    pub fn decode_standard(&self, input_data: &[u8], format: image::ImageFormat) -> Result<Image> {
        let options = &self.options;

        let decoded = {
            let _span = tracing::info_span!("decode_standard", ?format).entered();
            decode_standard(input_data, format)?
        };

        let image = {
            let _span = tracing::info_span!("crop").entered();
            let (height, width, _) = decoded.samples.dim();
            let region = crop_region(width, height, options.crop, options.crop_align)?;
            debug!(?region, "Cropping decoded image");
            Image::from_single(decoded.samples)
                .crop(region.x, region.y, region.width, region.height)?
        };

        if !options.to_float {
            return Ok(image);
        }

        let scale = decoded.sample_max;
        Ok(if options.srgb_to_linear {
            image.mapv(|v| srgb_to_linear(v / scale))
        } else {
            image.mapv(|v| v / scale)
        })
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ReadOptions) {
        self.options = options;
    }
}

/// Reads `path` with the default raw decoder and bilinear RGGB demosaic.
pub fn read_image<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<Image> {
    ReadPipeline::new(options.clone()).read_file(path)
}
