//! Band-based alpha correction.
//!
//! Bands are applied in order against the alpha plane as earlier bands left
//! it, so overlapping bands compose. A band that keeps its range (`target ==
//! None`) is skipped. With `preserve_gradient`, wide bands only snap values
//! that sit far from their target.

use serde::Serialize;

use crate::alpha::presets::{PresetMode, ThresholdBand};
use crate::core::PixelBuffer;
use crate::error::{EngineError, EngineResult};

/// Bands wider than this are treated as gradients when preserving.
const GRADIENT_SPAN: u8 = 50;
/// Values within this distance of the target are kept when preserving.
const GRADIENT_TOLERANCE: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrectionStats {
    /// Whether any alpha value differs from the input.
    pub modified: bool,
    /// Writes performed, counting a pixel once per band that rewrote it.
    pub pixels_written: u64,
    /// Pixels whose final alpha differs from the original.
    pub pixels_changed: u64,
    pub total_pixels: u64,
    pub modification_ratio: f64,
    pub mode: PresetMode,
    pub preserve_gradient: bool,
}

pub(crate) fn validate_bands(bands: &[ThresholdBand]) -> EngineResult<()> {
    bands.iter().try_for_each(ThresholdBand::validate)
}

/// Apply `bands` to an alpha plane in place and return the write count.
pub(crate) fn apply_bands(alpha: &mut [u8], bands: &[ThresholdBand], preserve_gradient: bool) -> u64 {
    let mut written = 0u64;
    for band in bands {
        let Some(target) = band.target else {
            continue;
        };
        let gradient = preserve_gradient && band.max - band.min > GRADIENT_SPAN;
        for value in alpha.iter_mut() {
            if !band.contains(*value) {
                continue;
            }
            if gradient && value.abs_diff(target) <= GRADIENT_TOLERANCE {
                continue;
            }
            *value = target;
            written += 1;
        }
    }
    written
}

/// Correct the alpha plane of `image` in place.
///
/// # Errors
///
/// Invalid input when the buffer has no alpha channel or a band has `min > max`.
/// The image is untouched on error.
pub fn correct_alpha_in_place(
    image: &mut PixelBuffer,
    bands: &[ThresholdBand],
    mode: PresetMode,
    preserve_gradient: bool,
) -> EngineResult<CorrectionStats> {
    validate_bands(bands)?;
    let original = image.alpha_plane().ok_or_else(|| {
        EngineError::invalid_input("channels", "alpha correction needs an RGBA buffer", image.channels())
    })?;

    let mut alpha = original.clone();
    let pixels_written = apply_bands(&mut alpha, bands, preserve_gradient);
    let pixels_changed = original.iter().zip(&alpha).filter(|(a, b)| a != b).count() as u64;
    if pixels_changed > 0 {
        image.write_alpha_plane(&alpha);
    }

    let total_pixels = alpha.len() as u64;
    Ok(CorrectionStats {
        modified: pixels_changed > 0,
        pixels_written,
        pixels_changed,
        total_pixels,
        modification_ratio: pixels_changed as f64 / total_pixels as f64,
        mode,
        preserve_gradient,
    })
}

/// Correct a copy of `image`; the input is left as it was.
pub fn correct_alpha(
    image: &PixelBuffer,
    bands: &[ThresholdBand],
    mode: PresetMode,
    preserve_gradient: bool,
) -> EngineResult<(PixelBuffer, CorrectionStats)> {
    let mut corrected = image.clone();
    let stats = correct_alpha_in_place(&mut corrected, bands, mode, preserve_gradient)?;
    Ok((corrected, stats))
}
