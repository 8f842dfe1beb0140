//! # Configuration Module
//!
//! Engine-wide defaults and backend selection. The configuration is the common
//! interface between embedding applications and the engine: it picks the
//! compute backend once and supplies the defaults that per-call parameters
//! fall back to.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Range | Description |
//! |-----------|------|-------|-------------|
//! | `backend` | `BackendPreference` | auto / accelerated / portable | Compute backend selection |
//! | `histogram_bins` | `usize` | 1-256 | Default bins per channel for color histograms |
//! | `edge_threshold` | `f64` | >= 0, finite | Sobel magnitude above which a pixel counts as an edge |
//! | `trace_threshold` | `u8` | 0-255 | Default tracer detail threshold (lower = more detail) |
//! | `trace_mode` | `TraceMode` | color / binary / spline / polygon / none | Default tracer mode |
//! | `preserve_gradient` | `bool` | true/false | Default for batch correction options |
//!
//! ## Environment Overrides
//!
//! [`EngineConfig::from_env`] starts from the defaults and applies:
//! - `TEXTURE_ENGINE_BACKEND`: `auto`, `accelerated` or `portable`
//! - `TEXTURE_ENGINE_HISTOGRAM_BINS`: integer bins
//! - `TEXTURE_ENGINE_EDGE_THRESHOLD`: float threshold
//!
//! ## Examples
//!
//! ```rust
//! use texture_engine::config::config::{BackendPreference, EngineConfig};
//!
//! // Use defaults
//! let config = EngineConfig::default();
//! assert_eq!(config.histogram_bins, 16);
//!
//! // Force the portable backend
//! let config = EngineConfig {
//!     backend: BackendPreference::Portable,
//!     ..EngineConfig::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::fmt;
use std::str::FromStr;

use crate::compute::trace::{TraceMode, TraceParams};
use crate::error::{EngineError, EngineResult};

/// Environment variable that overrides the backend preference.
pub const BACKEND_ENV: &str = "TEXTURE_ENGINE_BACKEND";
const BINS_ENV: &str = "TEXTURE_ENGINE_HISTOGRAM_BINS";
const EDGE_ENV: &str = "TEXTURE_ENGINE_EDGE_THRESHOLD";

/// Which compute backend the engine should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendPreference {
    /// Self-test the accelerated backend and use it when the test passes.
    #[default]
    Auto,
    /// Use the accelerated backend. Falls back to portable if it is not
    /// compiled in or fails its self-test.
    Accelerated,
    /// Never touch the accelerated backend.
    Portable,
}

impl FromStr for BackendPreference {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "accelerated" | "gpu" => Ok(Self::Accelerated),
            "portable" | "cpu" => Ok(Self::Portable),
            other => Err(EngineError::invalid_input(
                "backend",
                "must be one of auto, accelerated, portable",
                other,
            )),
        }
    }
}

impl fmt::Display for BackendPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Accelerated => "accelerated",
            Self::Portable => "portable",
        };
        f.write_str(name)
    }
}

/// Engine configuration.
///
/// # Examples
///
/// ```rust
/// use texture_engine::config::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.edge_threshold, 30.0);
/// assert!(!config.preserve_gradient);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Backend selection, resolved once when the engine context is built.
    pub backend: BackendPreference,

    /// Default number of buckets per channel for color histograms.
    ///
    /// Must be between 1 and 256 (inclusive).
    pub histogram_bins: usize,

    /// Sobel gradient magnitude above which a pixel is counted as an edge.
    pub edge_threshold: f64,

    /// Default tracer detail threshold. Lower values keep more detail.
    pub trace_threshold: u8,

    /// Default tracer mode.
    pub trace_mode: TraceMode,

    /// Default `preserve_gradient` of the batch options the alpha engine hands
    /// out: keep semi-transparent values that are already close to a band target.
    pub preserve_gradient: bool,
}

impl Default for EngineConfig {
    /// Default values:
    /// - `backend`: auto
    /// - `histogram_bins`: 16
    /// - `edge_threshold`: 30.0
    /// - `trace_threshold`: 25
    /// - `trace_mode`: color
    /// - `preserve_gradient`: false
    fn default() -> Self {
        Self {
            backend: BackendPreference::Auto,
            histogram_bins: 16,
            edge_threshold: 30.0,
            trace_threshold: 25,
            trace_mode: TraceMode::Color,
            preserve_gradient: false,
        }
    }
}

impl EngineConfig {
    /// Creates a new configuration with the specified parameters.
    pub fn new(
        backend: BackendPreference,
        histogram_bins: usize,
        edge_threshold: f64,
        trace_threshold: u8,
        trace_mode: TraceMode,
        preserve_gradient: bool,
    ) -> Self {
        Self {
            backend,
            histogram_bins,
            edge_threshold,
            trace_threshold,
            trace_mode,
            preserve_gradient,
        }
    }

    /// Defaults with environment overrides applied.
    ///
    /// Unset variables keep their defaults; set but malformed variables are
    /// reported as invalid input rather than silently ignored.
    pub fn from_env() -> EngineResult<Self> {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(BACKEND_ENV) {
            config.backend = value.parse()?;
        }
        if let Ok(value) = std::env::var(BINS_ENV) {
            config.histogram_bins = value
                .trim()
                .parse()
                .map_err(|_| EngineError::invalid_input(BINS_ENV, "must be an integer", &value))?;
        }
        if let Ok(value) = std::env::var(EDGE_ENV) {
            config.edge_threshold = value
                .trim()
                .parse()
                .map_err(|_| EngineError::invalid_input(EDGE_ENV, "must be a number", &value))?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration parameters.
    ///
    /// Time complexity: O(1), constant-time range checks.
    pub fn validate(&self) -> EngineResult<()> {
        if !(1..=256).contains(&self.histogram_bins) {
            return Err(EngineError::invalid_input(
                "histogram_bins",
                "must be between 1 and 256",
                self.histogram_bins,
            ));
        }
        if !self.edge_threshold.is_finite() || self.edge_threshold < 0.0 {
            return Err(EngineError::invalid_input(
                "edge_threshold",
                "must be a finite, non-negative number",
                self.edge_threshold,
            ));
        }
        Ok(())
    }

    /// Tracer parameters built from the configured defaults.
    pub fn trace_params(&self) -> TraceParams {
        TraceParams {
            threshold: self.trace_threshold,
            mode: self.trace_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.backend, BackendPreference::Auto);
        assert_eq!(config.histogram_bins, 16);
        assert_eq!(config.edge_threshold, 30.0);
        assert_eq!(config.trace_threshold, 25);
        assert_eq!(config.trace_mode, TraceMode::Color);
        assert!(!config.preserve_gradient);
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();

        // Valid config should pass
        assert!(config.validate().is_ok());

        // Invalid bins
        config.histogram_bins = 0;
        assert!(config.validate().is_err());
        config.histogram_bins = 257;
        assert!(config.validate().is_err());
        config.histogram_bins = 256;
        assert!(config.validate().is_ok());

        // Invalid edge threshold
        config.edge_threshold = -1.0;
        assert!(config.validate().is_err());
        config.edge_threshold = f64::NAN;
        assert!(config.validate().is_err());
        config.edge_threshold = 30.0; // Reset

        // Valid again
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backend_preference_parsing() {
        assert_eq!("Portable".parse::<BackendPreference>().unwrap(), BackendPreference::Portable);
        assert_eq!(" auto ".parse::<BackendPreference>().unwrap(), BackendPreference::Auto);
        assert_eq!("accelerated".parse::<BackendPreference>().unwrap(), BackendPreference::Accelerated);
        assert!("quantum".parse::<BackendPreference>().is_err());
        assert_eq!(BackendPreference::Portable.to_string(), "portable");
    }

    #[test]
    fn test_trace_params_follow_config() {
        let config = EngineConfig {
            trace_threshold: 40,
            trace_mode: TraceMode::Polygon,
            ..EngineConfig::default()
        };
        let params = config.trace_params();
        assert_eq!(params.threshold, 40);
        assert_eq!(params.mode, TraceMode::Polygon);
    }
}
