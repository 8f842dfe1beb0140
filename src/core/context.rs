//! # Engine Context
//!
//! Owned state shared by the dispatcher and the alpha engine: the backend
//! capability flag, resolved once, and the running correction totals.
//!
//! Counters are plain atomics so concurrent corrections can update them
//! without a lock. Totals only grow until [`EngineContext::reset_totals`] is
//! called.

use std::sync::atomic::{AtomicU64, Ordering};

use log::{info, warn};
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::config::config::BackendPreference;

/// The backend the context resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Accelerated,
    Portable,
}

/// Snapshot of the correction counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingTotals {
    pub images_processed: u64,
    pub images_modified: u64,
    pub pixels_modified: u64,
}

/// Shared engine state. Wrap in an `Arc` to hand it to several components.
#[derive(Debug)]
pub struct EngineContext {
    preference: BackendPreference,
    capability: OnceCell<BackendKind>,
    images_processed: AtomicU64,
    images_modified: AtomicU64,
    pixels_modified: AtomicU64,
}

impl EngineContext {
    pub fn new(preference: BackendPreference) -> Self {
        Self {
            preference,
            capability: OnceCell::new(),
            images_processed: AtomicU64::new(0),
            images_modified: AtomicU64::new(0),
            pixels_modified: AtomicU64::new(0),
        }
    }

    pub fn preference(&self) -> BackendPreference {
        self.preference
    }

    /// Resolve the backend on first use; later calls return the cached answer.
    pub fn backend_kind(&self) -> BackendKind {
        *self.capability.get_or_init(|| resolve_backend(self.preference))
    }

    pub fn is_accelerated(&self) -> bool {
        self.backend_kind() == BackendKind::Accelerated
    }

    /// Record one corrected image.
    pub fn record_correction(&self, pixels_changed: u64) {
        self.images_processed.fetch_add(1, Ordering::Relaxed);
        if pixels_changed > 0 {
            self.images_modified.fetch_add(1, Ordering::Relaxed);
            self.pixels_modified.fetch_add(pixels_changed, Ordering::Relaxed);
        }
    }

    pub fn totals(&self) -> ProcessingTotals {
        ProcessingTotals {
            images_processed: self.images_processed.load(Ordering::Relaxed),
            images_modified: self.images_modified.load(Ordering::Relaxed),
            pixels_modified: self.pixels_modified.load(Ordering::Relaxed),
        }
    }

    pub fn reset_totals(&self) {
        self.images_processed.store(0, Ordering::Relaxed);
        self.images_modified.store(0, Ordering::Relaxed);
        self.pixels_modified.store(0, Ordering::Relaxed);
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(BackendPreference::Auto)
    }
}

fn resolve_backend(preference: BackendPreference) -> BackendKind {
    if preference == BackendPreference::Portable {
        info!("Compute backend: portable (requested)");
        return BackendKind::Portable;
    }
    match crate::compute::self_test_accelerated() {
        Ok(()) => {
            info!("Compute backend: accelerated ({} preference)", preference);
            BackendKind::Accelerated
        }
        Err(e) => {
            if preference == BackendPreference::Accelerated {
                warn!("Accelerated backend requested but unavailable, using portable: {:#}", e);
            } else {
                info!("Compute backend: portable ({:#})", e);
            }
            BackendKind::Portable
        }
    }
}
