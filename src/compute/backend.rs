//! The seam between the dispatcher and the two compute implementations.

use crate::compute::trace::{TraceOutcome, TraceParams};
use crate::core::PixelBuffer;
use crate::error::EngineResult;

/// A complete set of compute operations.
///
/// Implementations accept RGB or RGBA buffers; the feature and trace
/// operations ignore alpha, the upscaler preserves the channel count. Inputs
/// are never mutated.
///
/// Batch methods return one independent result per input, in input order.
/// The default batch implementations run the single-image operation in a loop.
pub trait ComputeBackend: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    fn perceptual_hash(&self, image: &PixelBuffer) -> EngineResult<u64>;

    /// `3 * bins` channel-major frequencies; each channel sums to 1.0.
    fn color_histogram(&self, image: &PixelBuffer, bins: usize) -> EngineResult<Vec<f64>>;

    /// Fraction of interior pixels whose Sobel magnitude exceeds `threshold`.
    fn edge_density(&self, image: &PixelBuffer, threshold: f64) -> EngineResult<f64>;

    fn upscale(&self, image: &PixelBuffer, factor: u32) -> EngineResult<PixelBuffer>;

    fn trace(&self, image: &PixelBuffer, params: &TraceParams) -> EngineResult<TraceOutcome>;

    fn batch_perceptual_hash(&self, images: &[PixelBuffer]) -> Vec<EngineResult<u64>> {
        images.iter().map(|image| self.perceptual_hash(image)).collect()
    }

    fn batch_color_histogram(&self, images: &[PixelBuffer], bins: usize) -> Vec<EngineResult<Vec<f64>>> {
        images.iter().map(|image| self.color_histogram(image, bins)).collect()
    }

    fn batch_trace(&self, images: &[PixelBuffer], params: &TraceParams) -> Vec<EngineResult<TraceOutcome>> {
        images.iter().map(|image| self.trace(image, params)).collect()
    }
}
