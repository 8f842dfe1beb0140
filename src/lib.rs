//! # Texture Engine Library
//!
//! Analysis and correction of game textures: perceptual hashing, colour
//! histograms, edge density, integer upscaling, raster-to-SVG tracing and
//! alpha channel quantization.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `compute`: Feature extraction, upscaling and tracing behind a dispatcher
//!   with an accelerated backend and a portable fallback
//! - `alpha`: Alpha detection, band-based correction, presets and batch processing
//! - `core`: The pixel buffer and the shared engine context
//! - `config`: Configuration management and validation
//! - `store`: Image file access for batch processing
//!
//! ## Features
//!
//! - **Dual backend**: rayon + SIMD Lanczos when the `accelerated` feature is
//!   on, a sequential `image`-based path otherwise or on failure
//! - **Stable features**: hashes, histograms and edge densities match across backends
//! - **Console presets**: PS2, PSP, GameCube/Wii and Xbox alpha level sets
//!
//! ## Example
//!
//! ```rust
//! use texture_engine::{EngineConfig, PixelBuffer, TextureEngine};
//!
//! # fn example() -> texture_engine::EngineResult<()> {
//! let engine = TextureEngine::new(EngineConfig::default())?;
//!
//! let ramp: Vec<u8> = (0..=255u8).flat_map(|a| [200, 120, 40, a]).collect();
//! let texture = PixelBuffer::new(256, 1, 4, ramp)?;
//!
//! let hash = engine.compute().perceptual_hash(&texture)?;
//! let (fixed, stats) = engine.alpha().correct_with_preset(&texture, "ps2_binary", false)?;
//! assert!(stats.modified);
//! assert_eq!(fixed.width(), 256);
//! # let _ = hash;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use std::sync::Arc;

pub mod alpha;
pub mod compute;
pub mod config;
pub mod core;
pub mod error;
pub mod store;

pub use alpha::{AlphaEngine, BandSource, BatchOptions, CorrectionResult, ThresholdBand};
pub use compute::{Dispatcher, TraceMode, TraceOutcome, TraceParams};
pub use config::config::{BackendPreference, EngineConfig};
pub use crate::core::{EngineContext, PixelBuffer, ProcessingTotals};
pub use error::{EngineError, EngineResult};

/// Dispatcher and alpha engine sharing one [`EngineContext`].
pub struct TextureEngine {
    context: Arc<EngineContext>,
    compute: Dispatcher,
    alpha: AlphaEngine,
}

impl TextureEngine {
    /// Validate `config` and build the engine. The backend is resolved here.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let context = Arc::new(EngineContext::new(config.backend));
        let compute = Dispatcher::new(context.clone(), &config);
        let alpha = AlphaEngine::new(context.clone()).with_preserve_gradient(config.preserve_gradient);
        Ok(Self {
            context,
            compute,
            alpha,
        })
    }

    /// Engine configured from the environment, see [`EngineConfig::from_env`].
    pub fn from_env() -> EngineResult<Self> {
        Self::new(EngineConfig::from_env()?)
    }

    pub fn compute(&self) -> &Dispatcher {
        &self.compute
    }

    pub fn alpha(&self) -> &AlphaEngine {
        &self.alpha
    }

    pub fn context(&self) -> &Arc<EngineContext> {
        &self.context
    }
}
