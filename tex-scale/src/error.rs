// SPDX-License-Identifier: MIT
// Error type shared by the Lanczos and portable scaling paths.

#[cfg(feature = "accelerated")]
use fast_image_resize as fir;

#[derive(Debug)]
pub enum ScaleError {
    BufferTooSmall { needed: usize, got: usize },
    InputLength { expected: usize, actual: usize },
    UnsupportedChannels(u8),
    InvalidFactor(u32),
    ZeroSize,
    DimensionOverflow,
    #[cfg(feature = "accelerated")]
    Fir(fir::ResizeError),
    #[cfg(feature = "accelerated")]
    ImageBuf(fir::ImageBufferError),
}

#[cfg(feature = "accelerated")]
impl From<fir::ResizeError> for ScaleError { fn from(e: fir::ResizeError) -> Self { Self::Fir(e) } }
#[cfg(feature = "accelerated")]
impl From<fir::ImageBufferError> for ScaleError { fn from(e: fir::ImageBufferError) -> Self { Self::ImageBuf(e) } }

impl std::fmt::Display for ScaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleError::BufferTooSmall { needed, got } => {
                write!(f, "Output buffer too small: need {} bytes, got {}", needed, got)
            }
            ScaleError::InputLength { expected, actual } => {
                write!(f, "Input length {} does not match expected {}", actual, expected)
            }
            ScaleError::UnsupportedChannels(c) => write!(f, "Unsupported channel count {} (expected 3 or 4)", c),
            ScaleError::InvalidFactor(k) => write!(f, "Scale factor must be >= 1, got {}", k),
            ScaleError::ZeroSize => write!(f, "Input image has a zero dimension"),
            ScaleError::DimensionOverflow => write!(f, "Scaled dimensions overflow u32"),
            #[cfg(feature = "accelerated")]
            ScaleError::Fir(e) => write!(f, "Fast image resize error: {}", e),
            #[cfg(feature = "accelerated")]
            ScaleError::ImageBuf(e) => write!(f, "Image buffer error: {}", e),
        }
    }
}

impl std::error::Error for ScaleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "accelerated")]
            ScaleError::Fir(e) => Some(e),
            #[cfg(feature = "accelerated")]
            ScaleError::ImageBuf(e) => Some(e),
            _ => None,
        }
    }
}
