//! Debayering module for converting Bayer pattern mosaics to RGB
//!
//! The stage decides which kernel table (or backend) reconstructs the missing
//! colors; the readers only decide whether to run it at all.

pub mod cpu_debayer;
pub mod kernels;
pub mod types;

pub use cpu_debayer::CpuDebayer;
pub use kernels::{apply_demosaic_filter, DemosaicKernels};
pub use types::{Demosaic, KernelDemosaic};
