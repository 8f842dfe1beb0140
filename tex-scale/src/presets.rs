// SPDX-License-Identifier: MIT
//! # Upscale Presets and Plan Computation
//!
//! Texture upscaling always magnifies both axes by the same integer factor, so a
//! plan is little more than the checked output size. The plan is computed once
//! and handed to whichever scaling path runs, which guarantees both paths agree
//! on the output geometry.
//!
//! ## Presets
//!
//! Retro textures are usually 64–512px on a side. The common factors are:
//! - **X2**: light cleanup, keeps memory usage low
//! - **X4**: the usual choice for PS2-era textures
//! - **X8**: small UI icons and fonts
//!
//! Any factor `>= 1` is accepted by [`build_plan`]; the presets are only names.

use crate::ScaleError;

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

/// Complete upscale plan computed from the input size and factor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScalePlan {
    /// Original input dimensions
    pub input: Size,
    /// Integer magnification applied to both axes
    pub factor: u32,
    /// Final output dimensions (`input * factor`)
    pub out: Size,
}

impl ScalePlan {
    /// Byte length of the output buffer for `channels` interleaved 8-bit channels.
    pub fn out_len(&self, channels: u8) -> usize {
        (self.out.w as usize) * (self.out.h as usize) * channels as usize
    }

    /// Byte length the input buffer must have.
    pub fn in_len(&self, channels: u8) -> usize {
        (self.input.w as usize) * (self.input.h as usize) * channels as usize
    }
}

/// Compute an upscale plan.
///
/// # Errors
/// Returns [`ScaleError::InvalidFactor`] for a zero factor, [`ScaleError::ZeroSize`]
/// for an empty input and [`ScaleError::DimensionOverflow`] when the output size
/// does not fit in `u32`.
pub fn build_plan(input: Size, factor: u32) -> Result<ScalePlan, ScaleError> {
    if factor == 0 {
        return Err(ScaleError::InvalidFactor(factor));
    }
    if input.w == 0 || input.h == 0 {
        return Err(ScaleError::ZeroSize);
    }
    let w = input.w.checked_mul(factor).ok_or(ScaleError::DimensionOverflow)?;
    let h = input.h.checked_mul(factor).ok_or(ScaleError::DimensionOverflow)?;
    Ok(ScalePlan {
        input,
        factor,
        out: Size { w, h },
    })
}

/// Named upscale factors used by the texture tools.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpscalePreset {
    /// 2× magnification
    X2,
    /// 4× magnification (default for PS2 textures)
    X4,
    /// 8× magnification for tiny UI textures
    X8,
}

impl UpscalePreset {
    pub fn factor(self) -> u32 {
        match self {
            UpscalePreset::X2 => 2,
            UpscalePreset::X4 => 4,
            UpscalePreset::X8 => 8,
        }
    }
}
