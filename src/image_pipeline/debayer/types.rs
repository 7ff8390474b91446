//! Types for debayering operations

use std::sync::Arc;

use tracing::debug;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::debayer::kernels::{apply_demosaic_filter, DemosaicKernels};
use crate::image_pipeline::tensor::Image;

/// Turns a color-corrected `[batch, H, W, 1]` mosaic into `[batch, H, W, 3]` RGB.
pub trait Demosaic {
    fn demosaic(&self, mosaic: &Image) -> Result<Image>;
}

/// Demosaics by convolving with an injected, immutable kernel table.
///
/// The table is shared behind an `Arc` so one copy built at startup can be
/// handed to every reader.
#[derive(Debug, Clone)]
pub struct KernelDemosaic {
    kernels: Arc<DemosaicKernels>,
}

impl KernelDemosaic {
    pub fn new(kernels: Arc<DemosaicKernels>) -> Self {
        Self { kernels }
    }

    pub fn kernels(&self) -> &DemosaicKernels {
        &self.kernels
    }
}

impl Default for KernelDemosaic {
    fn default() -> Self {
        Self::new(Arc::new(DemosaicKernels::bilinear_rggb()))
    }
}

impl Demosaic for KernelDemosaic {
    fn demosaic(&self, mosaic: &Image) -> Result<Image> {
        debug!(
            "Demosaicing {}x{} mosaic with {}x{} kernels",
            mosaic.width(),
            mosaic.height(),
            self.kernels.size(),
            self.kernels.size()
        );
        apply_demosaic_filter(mosaic, &self.kernels)
    }
}
