//! # Compute Dispatcher
//!
//! Single entry point for every compute operation. The backend is chosen once
//! from the engine context; each call runs on the accelerated backend when it
//! is active and falls back to the portable backend when that call fails.
//!
//! ```text
//! caller ──▶ Dispatcher::route ──▶ accelerated ──ok──▶ result
//!                                      │
//!                                    error (logged)
//!                                      ▼
//!                                   portable ──▶ result / error
//! ```
//!
//! A panic inside the accelerated backend is caught and treated like a
//! backend error. Invalid input is not retried: both backends validate the
//! same way, so the error goes straight back to the caller.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::{debug, warn};

use crate::compute::backend::ComputeBackend;
use crate::compute::portable::PortableBackend;
use crate::compute::trace::{TraceOutcome, TraceParams};
use crate::config::config::EngineConfig;
use crate::core::{EngineContext, PixelBuffer};
use crate::error::{EngineError, EngineResult};

pub struct Dispatcher {
    context: Arc<EngineContext>,
    accelerated: Option<Box<dyn ComputeBackend>>,
    portable: PortableBackend,
    histogram_bins: usize,
    edge_threshold: f64,
    trace_params: TraceParams,
}

impl Dispatcher {
    /// Build a dispatcher for `context`, resolving its backend now.
    pub fn new(context: Arc<EngineContext>, config: &EngineConfig) -> Self {
        let accelerated = if context.is_accelerated() {
            accelerated_backend()
        } else {
            None
        };
        Self::with_backend(context, config, accelerated)
    }

    /// Build a dispatcher around an explicit primary backend, bypassing the
    /// context's capability self-test. `None` runs everything on the portable backend.
    pub fn with_backend(
        context: Arc<EngineContext>,
        config: &EngineConfig,
        accelerated: Option<Box<dyn ComputeBackend>>,
    ) -> Self {
        Self {
            context,
            accelerated,
            portable: PortableBackend::new(),
            histogram_bins: config.histogram_bins,
            edge_threshold: config.edge_threshold,
            trace_params: config.trace_params(),
        }
    }

    pub fn context(&self) -> &Arc<EngineContext> {
        &self.context
    }

    /// Name of the backend tried first.
    pub fn active_backend(&self) -> &'static str {
        match &self.accelerated {
            Some(backend) => backend.name(),
            None => self.portable.name(),
        }
    }

    fn route<T>(
        &self,
        operation: &str,
        run: impl Fn(&dyn ComputeBackend) -> EngineResult<T>,
    ) -> EngineResult<T> {
        if let Some(primary) = &self.accelerated {
            let attempt = panic::catch_unwind(AssertUnwindSafe(|| run(primary.as_ref()))).unwrap_or_else(
                |payload| Err(EngineError::backend(primary.name(), operation, panic_reason(payload))),
            );
            match attempt {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_recoverable() => return Err(e),
                Err(e) => warn!(
                    "{} backend failed during {}, falling back to portable: {}",
                    primary.name(),
                    operation,
                    e
                ),
            }
        }
        run(&self.portable)
    }

    fn route_batch<T>(
        &self,
        operation: &str,
        images: &[PixelBuffer],
        batch: impl Fn(&dyn ComputeBackend, &[PixelBuffer]) -> Vec<EngineResult<T>>,
        single: impl Fn(&dyn ComputeBackend, &PixelBuffer) -> EngineResult<T>,
    ) -> Vec<EngineResult<T>> {
        let Some(primary) = &self.accelerated else {
            return batch(&self.portable, images);
        };
        debug!("{} on {} images via {}", operation, images.len(), primary.name());
        let results = match panic::catch_unwind(AssertUnwindSafe(|| batch(primary.as_ref(), images))) {
            Ok(results) => results,
            Err(payload) => {
                let reason = panic_reason(payload);
                images
                    .iter()
                    .map(|_| Err(EngineError::backend(primary.name(), operation, &reason)))
                    .collect()
            }
        };
        results
            .into_iter()
            .zip(images)
            .enumerate()
            .map(|(index, (result, image))| match result {
                Err(e) if e.is_recoverable() => {
                    warn!(
                        "{} backend failed during {} (item {}), falling back to portable: {}",
                        primary.name(),
                        operation,
                        index,
                        e
                    );
                    single(&self.portable, image)
                }
                other => other,
            })
            .collect()
    }

    pub fn perceptual_hash(&self, image: &PixelBuffer) -> EngineResult<u64> {
        self.route("perceptual_hash", |backend| backend.perceptual_hash(image))
    }

    pub fn batch_perceptual_hash(&self, images: &[PixelBuffer]) -> Vec<EngineResult<u64>> {
        self.route_batch(
            "batch_perceptual_hash",
            images,
            |backend, images| backend.batch_perceptual_hash(images),
            |backend, image| backend.perceptual_hash(image),
        )
    }

    pub fn color_histogram(&self, image: &PixelBuffer, bins: usize) -> EngineResult<Vec<f64>> {
        self.route("color_histogram", |backend| backend.color_histogram(image, bins))
    }

    /// Histogram with the configured default bin count.
    pub fn default_color_histogram(&self, image: &PixelBuffer) -> EngineResult<Vec<f64>> {
        self.color_histogram(image, self.histogram_bins)
    }

    pub fn batch_color_histogram(&self, images: &[PixelBuffer], bins: usize) -> Vec<EngineResult<Vec<f64>>> {
        self.route_batch(
            "batch_color_histogram",
            images,
            |backend, images| backend.batch_color_histogram(images, bins),
            |backend, image| backend.color_histogram(image, bins),
        )
    }

    /// Edge density at the configured threshold.
    pub fn edge_density(&self, image: &PixelBuffer) -> EngineResult<f64> {
        self.edge_density_with(image, self.edge_threshold)
    }

    pub fn edge_density_with(&self, image: &PixelBuffer, threshold: f64) -> EngineResult<f64> {
        self.route("edge_density", |backend| backend.edge_density(image, threshold))
    }

    pub fn upscale(&self, image: &PixelBuffer, factor: u32) -> EngineResult<PixelBuffer> {
        self.route("upscale", |backend| backend.upscale(image, factor))
    }

    pub fn trace(&self, image: &PixelBuffer, params: &TraceParams) -> EngineResult<TraceOutcome> {
        self.route("trace", |backend| backend.trace(image, params))
    }

    /// Trace with the configured default threshold and mode.
    pub fn default_trace(&self, image: &PixelBuffer) -> EngineResult<TraceOutcome> {
        self.trace(image, &self.trace_params)
    }

    pub fn batch_trace(&self, images: &[PixelBuffer], params: &TraceParams) -> Vec<EngineResult<TraceOutcome>> {
        self.route_batch(
            "batch_trace",
            images,
            |backend, images| backend.batch_trace(images, params),
            |backend, image| backend.trace(image, params),
        )
    }
}

fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown payload".to_string());
    format!("panicked: {}", message)
}

#[cfg(feature = "accelerated")]
fn accelerated_backend() -> Option<Box<dyn ComputeBackend>> {
    Some(Box::new(crate::compute::accelerated::AcceleratedBackend::new()))
}

#[cfg(not(feature = "accelerated"))]
fn accelerated_backend() -> Option<Box<dyn ComputeBackend>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config::BackendPreference;
    use crate::error::EngineError;

    /// Fails every operation with a recoverable backend error.
    struct BrokenBackend;

    impl ComputeBackend for BrokenBackend {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn perceptual_hash(&self, _: &PixelBuffer) -> EngineResult<u64> {
            Err(EngineError::backend("broken", "perceptual_hash", "device lost"))
        }
        fn color_histogram(&self, _: &PixelBuffer, _: usize) -> EngineResult<Vec<f64>> {
            Err(EngineError::backend("broken", "color_histogram", "device lost"))
        }
        fn edge_density(&self, _: &PixelBuffer, _: f64) -> EngineResult<f64> {
            Err(EngineError::backend("broken", "edge_density", "device lost"))
        }
        fn upscale(&self, _: &PixelBuffer, _: u32) -> EngineResult<PixelBuffer> {
            Err(EngineError::backend("broken", "upscale", "device lost"))
        }
        fn trace(&self, _: &PixelBuffer, _: &TraceParams) -> EngineResult<TraceOutcome> {
            Err(EngineError::backend("broken", "trace", "device lost"))
        }
    }

    /// Panics in every operation, like a resize or rayon worker blowing up.
    struct PanickingBackend;

    impl ComputeBackend for PanickingBackend {
        fn name(&self) -> &'static str {
            "panicking"
        }
        fn perceptual_hash(&self, _: &PixelBuffer) -> EngineResult<u64> {
            panic!("hash kernel exploded")
        }
        fn color_histogram(&self, _: &PixelBuffer, _: usize) -> EngineResult<Vec<f64>> {
            panic!("histogram kernel exploded")
        }
        fn edge_density(&self, _: &PixelBuffer, _: f64) -> EngineResult<f64> {
            panic!("edge kernel exploded")
        }
        fn upscale(&self, _: &PixelBuffer, factor: u32) -> EngineResult<PixelBuffer> {
            panic!("resize exploded at {}x", factor)
        }
        fn trace(&self, _: &PixelBuffer, _: &TraceParams) -> EngineResult<TraceOutcome> {
            panic!("tracer exploded")
        }
    }

    fn broken_dispatcher() -> Dispatcher {
        let context = Arc::new(EngineContext::new(BackendPreference::Portable));
        Dispatcher::with_backend(context, &EngineConfig::default(), Some(Box::new(BrokenBackend)))
    }

    #[test]
    fn failures_fall_back_to_portable() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dispatcher = broken_dispatcher();
        assert_eq!(dispatcher.active_backend(), "broken");

        let image = PixelBuffer::filled(4, 4, &[200, 100, 50, 255]).unwrap();
        assert_eq!(dispatcher.perceptual_hash(&image).unwrap(), 0);
        assert_eq!(dispatcher.default_color_histogram(&image).unwrap().len(), 48);
        assert_eq!(dispatcher.edge_density(&image).unwrap(), 0.0);
        let up = dispatcher.upscale(&image, 2).unwrap();
        assert_eq!((up.width(), up.height(), up.channels()), (8, 8, 4));
        assert!(dispatcher.default_trace(&image).unwrap().is_empty());
    }

    #[test]
    fn batch_failures_fall_back_per_item() {
        let dispatcher = broken_dispatcher();
        let images = vec![
            PixelBuffer::filled(4, 4, &[0, 0, 0]).unwrap(),
            PixelBuffer::filled(4, 4, &[9, 9, 9]).unwrap(),
        ];
        let hashes = dispatcher.batch_perceptual_hash(&images);
        assert!(hashes.iter().all(|h| h.is_ok()));
        let traces = dispatcher.batch_trace(&images, &TraceParams::default());
        assert_eq!(traces.len(), 2);
    }

    #[test]
    fn panics_fall_back_to_portable() {
        let _ = env_logger::builder().is_test(true).try_init();
        let context = Arc::new(EngineContext::new(BackendPreference::Portable));
        let dispatcher =
            Dispatcher::with_backend(context, &EngineConfig::default(), Some(Box::new(PanickingBackend)));

        let image = PixelBuffer::filled(4, 4, &[30, 60, 90]).unwrap();
        assert_eq!(dispatcher.perceptual_hash(&image).unwrap(), 0);
        assert_eq!(dispatcher.color_histogram(&image, 8).unwrap().len(), 24);
        assert_eq!(dispatcher.edge_density(&image).unwrap(), 0.0);
        let up = dispatcher.upscale(&image, 3).unwrap();
        assert_eq!((up.width(), up.height()), (12, 12));

        let images = vec![image.clone(), image];
        let hashes = dispatcher.batch_perceptual_hash(&images);
        assert_eq!(hashes.len(), 2);
        assert!(hashes.iter().all(|h| matches!(h, Ok(0))));
        assert_eq!(dispatcher.batch_trace(&images, &TraceParams::default()).len(), 2);
    }

    #[test]
    fn panic_reason_keeps_message() {
        let payload = panic::catch_unwind(|| -> u8 { panic!("lost {}", "device") }).unwrap_err();
        assert_eq!(panic_reason(payload), "panicked: lost device");
        let payload = panic::catch_unwind(|| -> u8 { panic!("static") }).unwrap_err();
        assert_eq!(panic_reason(payload), "panicked: static");
    }

    #[test]
    fn invalid_input_is_not_retried() {
        let dispatcher = Dispatcher::new(
            Arc::new(EngineContext::new(BackendPreference::Portable)),
            &EngineConfig::default(),
        );
        let image = PixelBuffer::filled(4, 4, &[0, 0, 0]).unwrap();
        let err = dispatcher.color_histogram(&image, 0).unwrap_err();
        assert_eq!(err.category(), "invalid_input");
        assert_eq!(dispatcher.upscale(&image, 0).unwrap_err().category(), "invalid_input");
    }
}
