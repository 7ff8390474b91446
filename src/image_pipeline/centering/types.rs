//! Centering configuration types

/// Options shared by the `center_*` functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CenterOptions {
    /// Zero border added on each side before centering, so shifted content
    /// wraps into empty space instead of across the frame
    pub pad: usize,
    /// Restrict shifts to even values, keeping 2×2 Bayer tiles intact
    pub only_even_shifts: bool,
    /// Spatial axes to center, counted inwards from width: 1 centers width
    /// only, 2 centers width and height
    pub num_spatial_dims: usize,
    /// Sum channels into one intensity before finding the centroid. When
    /// unset every channel is centered on its own centroid.
    pub collapse_channels: bool,
}

impl Default for CenterOptions {
    fn default() -> Self {
        Self {
            pad: 0,
            only_even_shifts: false,
            num_spatial_dims: 2,
            collapse_channels: true,
        }
    }
}

impl CenterOptions {
    pub fn builder() -> CenterOptionsBuilder {
        CenterOptionsBuilder::default()
    }
}

/// Builder for CenterOptions
#[derive(Default)]
pub struct CenterOptionsBuilder {
    pad: Option<usize>,
    only_even_shifts: Option<bool>,
    num_spatial_dims: Option<usize>,
    collapse_channels: Option<bool>,
}

impl CenterOptionsBuilder {
    pub fn pad(mut self, pad: usize) -> Self {
        self.pad = Some(pad);
        self
    }

    pub fn only_even_shifts(mut self, enable: bool) -> Self {
        self.only_even_shifts = Some(enable);
        self
    }

    pub fn num_spatial_dims(mut self, dims: usize) -> Self {
        self.num_spatial_dims = Some(dims);
        self
    }

    pub fn collapse_channels(mut self, enable: bool) -> Self {
        self.collapse_channels = Some(enable);
        self
    }

    pub fn build(self) -> CenterOptions {
        let default = CenterOptions::default();
        CenterOptions {
            pad: self.pad.unwrap_or(default.pad),
            only_even_shifts: self.only_even_shifts.unwrap_or(default.only_even_shifts),
            num_spatial_dims: self.num_spatial_dims.unwrap_or(default.num_spatial_dims),
            collapse_channels: self.collapse_channels.unwrap_or(default.collapse_channels),
        }
    }
}
