//! # Engine Error Types
//!
//! A single error enum covers every failure the engine can report. Errors are
//! built through named constructors (`EngineError::invalid_input(..)`,
//! `EngineError::backend(..)`, ...) so call sites read as a description of what
//! went wrong rather than a struct literal.
//!
//! ## Classification
//!
//! - **Invalid input**: buffer/parameter shape violations. Propagated to the
//!   direct caller immediately, never retried.
//! - **Backend**: the accelerated backend failed. The dispatcher logs it and
//!   reruns the operation on the portable backend, so callers only see it when
//!   both backends fail.
//! - **Unknown preset**: a caller asked for a preset name the catalog lacks.
//! - **Missing alpha / I/O / codec**: per-file batch failures, attached to the
//!   item's result instead of aborting the batch.
//!
//! ## Usage
//!
//! ```rust
//! use texture_engine::error::EngineError;
//!
//! let error = EngineError::invalid_input("bins", "must be between 1 and 256", "0");
//! assert_eq!(error.category(), "invalid_input");
//! assert!(!error.is_recoverable());
//! ```

use std::path::{Path, PathBuf};

/// Base error type for the texture engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Shape or parameter violations (buffer length, zero size, bad factor, ...)
    #[error("Invalid input for '{field}': {constraint} (value: {value})")]
    InvalidInput {
        field: String,
        constraint: String,
        value: String,
    },
    /// Accelerated backend failures
    #[error("Backend '{backend}' failed during {operation}: {reason}")]
    Backend {
        backend: String,
        operation: String,
        reason: String,
    },
    /// Preset name not present in the catalog
    #[error("Unknown preset '{name}'")]
    UnknownPreset { name: String },
    /// Image has no alpha channel to analyse or correct
    #[error("No alpha channel in '{}'", .path.display())]
    MissingAlpha { path: PathBuf },
    /// File system errors raised by an image store
    #[error("I/O error during {operation} on '{}': {source}", .path.display())]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Image decode/encode failures raised by an image store
    #[error("Codec error on '{}': {reason}", .path.display())]
    Codec { path: PathBuf, reason: String },
    /// Internal processing failures
    #[error("Processing failed during {operation}: {reason}")]
    Processing { operation: String, reason: String },
}

impl EngineError {
    /// Create an invalid-input error
    pub fn invalid_input(
        field: impl Into<String>,
        constraint: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self::InvalidInput {
            field: field.into(),
            constraint: constraint.into(),
            value: value.to_string(),
        }
    }

    /// Create a backend error
    pub fn backend(
        backend: impl Into<String>,
        operation: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::Backend {
            backend: backend.into(),
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an unknown-preset error
    pub fn unknown_preset(name: impl Into<String>) -> Self {
        Self::UnknownPreset { name: name.into() }
    }

    /// Create a missing-alpha error
    pub fn missing_alpha(path: impl AsRef<Path>) -> Self {
        Self::MissingAlpha {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a codec error
    pub fn codec(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::Codec {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Create a processing error
    pub fn processing(operation: impl Into<String>, reason: impl ToString) -> Self {
        Self::Processing {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::Backend { .. } => "backend",
            Self::UnknownPreset { .. } => "unknown_preset",
            Self::MissingAlpha { .. } => "missing_alpha",
            Self::Io { .. } => "io",
            Self::Codec { .. } => "codec",
            Self::Processing { .. } => "processing",
        }
    }

    /// Whether the dispatcher may recover by rerunning on the portable backend.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Backend { .. } | Self::Processing { .. })
    }
}

impl From<tex_scale::ScaleError> for EngineError {
    fn from(error: tex_scale::ScaleError) -> Self {
        use tex_scale::ScaleError;
        match error {
            ScaleError::InvalidFactor(k) => {
                Self::invalid_input("scale_factor", "must be >= 1", k)
            }
            ScaleError::ZeroSize => Self::invalid_input("dimensions", "must be non-zero", "0"),
            ScaleError::UnsupportedChannels(c) => {
                Self::invalid_input("channels", "must be 3 or 4", c)
            }
            ScaleError::InputLength { expected, actual } => Self::invalid_input(
                "data",
                format!("length must equal width*height*channels = {}", expected),
                actual,
            ),
            ScaleError::DimensionOverflow => {
                Self::invalid_input("scale_factor", "scaled dimensions overflow u32", "overflow")
            }
            other => Self::backend("tex-scale", "upscale", other),
        }
    }
}

/// Result type alias using the engine error type
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = EngineError::invalid_input("channels", "must be 3 or 4", 2);
        assert_eq!(error.category(), "invalid_input");
        assert!(!error.is_recoverable());
        assert_eq!(
            error.to_string(),
            "Invalid input for 'channels': must be 3 or 4 (value: 2)"
        );
    }

    #[test]
    fn test_backend_errors_are_recoverable() {
        let error = EngineError::backend("accelerated", "upscale", "resize failed");
        assert_eq!(error.category(), "backend");
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_scale_error_conversion() {
        let error: EngineError = tex_scale::ScaleError::InvalidFactor(0).into();
        assert_eq!(error.category(), "invalid_input");
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = EngineError::io("load", "/tmp/a.png", source);
        assert!(error.source().is_some());
        assert_eq!(error.category(), "io");
    }
}
