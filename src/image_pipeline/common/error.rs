use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Failed to encode PNG image: {0}")]
    EncodeError(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Invalid image shape: {0}")]
    InvalidShape(String),

    #[error("Demosaic failed: {0}")]
    DemosaicError(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The image has no mass to take a centroid of (all zero, or non-finite sums).
    #[error("Cannot center image: total mass is {0}")]
    DegenerateCentroid(f64),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConversionError>;
