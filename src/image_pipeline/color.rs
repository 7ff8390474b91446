//! Color processing: per-tile sensor correction and sRGB transfer curves.

pub mod correction;
pub mod srgb;

pub use correction::{apply_color_correction, check_sensor_pattern};
pub use srgb::{linear_to_srgb, srgb_to_linear};
