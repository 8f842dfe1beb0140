// SPDX-License-Identifier: MIT
// Lanczos-3 upscaler built on fast_image_resize (SIMD, rows split across rayon workers).
// RGB8/RGBA8 in → same layout out, direct write into caller-provided dst buffer.

use fast_image_resize as fir;
use fir::images::{TypedImage, TypedImageRef};
use fir::pixels::{U8x3, U8x4};
use fir::{FilterType, ResizeAlg, ResizeOptions, Resizer};

use crate::presets::ScalePlan;
use crate::ScaleError;

/// Main Lanczos entry point.
/// `src` must be tightly packed `plan.input.w * plan.input.h * channels` bytes.
/// `dst` must hold at least `plan.out_len(channels)` bytes; only that prefix is written.
pub fn upscale_lanczos(
    resizer: &mut Resizer,
    src: &[u8],
    channels: u8,
    plan: &ScalePlan,
    dst: &mut [u8],
) -> Result<(), ScaleError> {
    let expected = plan.in_len(channels);
    if src.len() != expected {
        return Err(ScaleError::InputLength { expected, actual: src.len() });
    }
    let dst_len = plan.out_len(channels);
    if dst.len() < dst_len {
        return Err(ScaleError::BufferTooSmall { needed: dst_len, got: dst.len() });
    }

    // Channels are filtered independently; premultiplying would darken
    // colour under transparent texels.
    let opts = ResizeOptions::new()
        .resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3))
        .use_alpha(false);

    match channels {
        3 => {
            let src_view = TypedImageRef::<U8x3>::from_buffer(plan.input.w, plan.input.h, src)?;
            let mut dst_image =
                TypedImage::<U8x3>::from_buffer(plan.out.w, plan.out.h, &mut dst[..dst_len])?;
            resizer.resize_typed::<U8x3>(&src_view, &mut dst_image, &opts)?;
        }
        4 => {
            let src_view = TypedImageRef::<U8x4>::from_buffer(plan.input.w, plan.input.h, src)?;
            let mut dst_image =
                TypedImage::<U8x4>::from_buffer(plan.out.w, plan.out.h, &mut dst[..dst_len])?;
            resizer.resize_typed::<U8x4>(&src_view, &mut dst_image, &opts)?;
        }
        other => return Err(ScaleError::UnsupportedChannels(other)),
    }

    Ok(())
}

/// Allocating wrapper around [`upscale_lanczos`] with a fresh resizer.
pub fn upscale_lanczos_vec(src: &[u8], channels: u8, plan: &ScalePlan) -> Result<Vec<u8>, ScaleError> {
    let mut resizer = Resizer::new();
    let mut out = vec![0u8; plan.out_len(channels)];
    upscale_lanczos(&mut resizer, src, channels, plan, &mut out)?;
    Ok(out)
}
