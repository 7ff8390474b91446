//! Read and write configuration types

use crate::image_pipeline::crop::DEFAULT_CROP_ALIGN;

/// Configuration for reading an image into a float tensor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Convert to normalized float. When false, samples keep their integer
    /// code values and no color processing runs.
    pub to_float: bool,
    /// Decode sRGB-encoded standard images to linear light
    pub srgb_to_linear: bool,
    /// Centered crop as `(width, height)`
    pub crop: Option<(usize, usize)>,
    /// Crop origin is snapped down to a multiple of this
    pub crop_align: usize,
    /// Subtract black levels and apply daylight white balance (raw only)
    pub color_balance: bool,
    /// Reconstruct RGB from the Bayer mosaic (raw only)
    pub demosaic: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            to_float: true,
            srgb_to_linear: true,
            crop: None,
            crop_align: DEFAULT_CROP_ALIGN,
            color_balance: true,
            demosaic: true,
        }
    }
}

impl ReadOptions {
    pub fn builder() -> ReadOptionsBuilder {
        ReadOptionsBuilder::default()
    }
}

/// Builder for ReadOptions
#[derive(Default)]
pub struct ReadOptionsBuilder {
    to_float: Option<bool>,
    srgb_to_linear: Option<bool>,
    crop: Option<Option<(usize, usize)>>,
    crop_align: Option<usize>,
    color_balance: Option<bool>,
    demosaic: Option<bool>,
}

impl ReadOptionsBuilder {
    pub fn to_float(mut self, enable: bool) -> Self {
        self.to_float = Some(enable);
        self
    }

    pub fn srgb_to_linear(mut self, enable: bool) -> Self {
        self.srgb_to_linear = Some(enable);
        self
    }

    pub fn crop(mut self, crop: Option<(usize, usize)>) -> Self {
        self.crop = Some(crop);
        self
    }

    pub fn crop_align(mut self, align: usize) -> Self {
        self.crop_align = Some(align);
        self
    }

    pub fn color_balance(mut self, enable: bool) -> Self {
        self.color_balance = Some(enable);
        self
    }

    pub fn demosaic(mut self, enable: bool) -> Self {
        self.demosaic = Some(enable);
        self
    }

    pub fn build(self) -> ReadOptions {
        let default = ReadOptions::default();
        ReadOptions {
            to_float: self.to_float.unwrap_or(default.to_float),
            srgb_to_linear: self.srgb_to_linear.unwrap_or(default.srgb_to_linear),
            crop: self.crop.unwrap_or(default.crop),
            crop_align: self.crop_align.unwrap_or(default.crop_align),
            color_balance: self.color_balance.unwrap_or(default.color_balance),
            demosaic: self.demosaic.unwrap_or(default.demosaic),
        }
    }
}

/// Configuration for writing a linear float image as 8-bit sRGB PNG
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Divide by the image maximum first
    pub normalize: bool,
    /// Clamp values above 1.0
    pub saturate: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            normalize: false,
            saturate: true,
        }
    }
}

impl WriteOptions {
    pub fn builder() -> WriteOptionsBuilder {
        WriteOptionsBuilder::default()
    }
}

/// Builder for WriteOptions
#[derive(Default)]
pub struct WriteOptionsBuilder {
    normalize: Option<bool>,
    saturate: Option<bool>,
}

impl WriteOptionsBuilder {
    pub fn normalize(mut self, enable: bool) -> Self {
        self.normalize = Some(enable);
        self
    }

    pub fn saturate(mut self, enable: bool) -> Self {
        self.saturate = Some(enable);
        self
    }

    pub fn build(self) -> WriteOptions {
        let default = WriteOptions::default();
        WriteOptions {
            normalize: self.normalize.unwrap_or(default.normalize),
            saturate: self.saturate.unwrap_or(default.saturate),
        }
    }
}
