//! # Compute Layer
//!
//! Image feature extraction, upscaling and vector tracing behind one
//! [`Dispatcher`]. Two backends implement [`ComputeBackend`]:
//!
//! - [`accelerated::AcceleratedBackend`]: rayon + `fast_image_resize`, built
//!   with the default `accelerated` feature
//! - [`portable::PortableBackend`]: single-threaded, always available
//!
//! Hash, histogram and edge results are identical across backends; the
//! upscaler and tracer trade quality for portability on the fallback path.

#[cfg(feature = "accelerated")]
pub mod accelerated;
pub mod backend;
pub mod dispatcher;
pub mod features;
pub mod portable;
pub mod trace;

pub use backend::ComputeBackend;
pub use dispatcher::Dispatcher;
pub use features::{find_duplicate_groups, hamming_distance, histogram_intersection};
pub use trace::{TraceMode, TraceOutcome, TraceParams};

/// Check whether the accelerated backend can run here.
#[cfg(feature = "accelerated")]
pub(crate) fn self_test_accelerated() -> anyhow::Result<()> {
    accelerated::self_test()
}

#[cfg(not(feature = "accelerated"))]
pub(crate) fn self_test_accelerated() -> anyhow::Result<()> {
    anyhow::bail!("built without the `accelerated` feature")
}
