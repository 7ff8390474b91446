//! Center-of-mass alignment
//!
//! Images are rolled cyclically so their intensity centroid lands on the
//! geometric center. Spatial offsets and shifts are ordered from the
//! innermost spatial axis outwards: width first, then height.

mod center;
pub mod moments;
pub mod shift;
pub mod types;

pub use center::{center_image, center_image_per_channel, center_images, center_shift};
pub use moments::{center_of_mass, CenterOfMass};
pub use shift::{pad_image, roll, ShiftVector};
pub use types::{CenterOptions, CenterOptionsBuilder};
