//! Image ingestion pipeline module
//!
//! Raw sensor and standard image files are read into linear float tensors,
//! optionally color-corrected and demosaiced, and can be recentered on their
//! center of mass before stacking.

pub mod centering;
pub mod color;
pub mod common;
pub mod conversions;
pub mod crop;
pub mod debayer;
pub mod format;
pub mod plot;
pub mod raw;
pub mod standard;
pub mod tensor;

pub use common::{
    ConversionError,
    Result,
};

pub use tensor::Image;

pub use raw::{
    BayerPattern,
    BayerTile,
    CfaColor,
    RawFrame,
    RawMetadata,
    RawSensorReader,
    RawLoaderReader,
};

pub use debayer::{
    apply_demosaic_filter,
    CpuDebayer,
    Demosaic,
    DemosaicKernels,
    KernelDemosaic,
};

pub use centering::{
    center_image,
    center_image_per_channel,
    center_images,
    center_of_mass,
    CenterOptions,
    ShiftVector,
};

pub use conversions::{
    read_image,
    write_image,
    write_sequential_image,
    ReadOptions,
    ReadPipeline,
    WriteOptions,
};

pub use format::SourceFormat;
