//! # Accelerated Backend
//!
//! Data-parallel implementations: pixel kernels fan out over rayon, the
//! upscaler is a SIMD Lanczos-3 convolution from `fast_image_resize`, and the
//! tracer outlines its colour regions in parallel.
//!
//! Compiled only with the `accelerated` feature. Whether it is actually used
//! is decided once by [`self_test`] through the engine context.

use anyhow::{ensure, Context};
use rayon::prelude::*;
use tex_scale::cpu::upscale_lanczos_vec;
use tex_scale::presets::{build_plan, Size};

use crate::compute::backend::ComputeBackend;
use crate::compute::features;
use crate::compute::trace::{self, TraceOutcome, TraceParams};
use crate::core::PixelBuffer;
use crate::error::{EngineError, EngineResult};

/// Pixels per histogram work unit.
const HISTOGRAM_CHUNK: usize = 16 * 1024;

#[derive(Debug, Default, Clone, Copy)]
pub struct AcceleratedBackend;

impl AcceleratedBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Upscale a tiny RGBA image to check the resizer works on this machine.
pub fn self_test() -> anyhow::Result<()> {
    let plan = build_plan(Size { w: 2, h: 2 }, 2).context("planning self-test resize")?;
    let src = [10u8, 20, 30, 255].repeat(4);
    let out = upscale_lanczos_vec(&src, 4, &plan).context("lanczos self-test")?;
    ensure!(
        out.len() == plan.out_len(4),
        "self-test produced {} bytes, expected {}",
        out.len(),
        plan.out_len(4)
    );
    Ok(())
}

fn grayscale(rgb: &PixelBuffer) -> Vec<f64> {
    rgb.data().par_chunks_exact(3).map(features::luma).collect()
}

fn luma_plane(rgb: &PixelBuffer) -> Vec<u64> {
    rgb.data().par_chunks_exact(3).map(features::luma_fixed).collect()
}

impl ComputeBackend for AcceleratedBackend {
    fn name(&self) -> &'static str {
        "accelerated"
    }

    fn perceptual_hash(&self, image: &PixelBuffer) -> EngineResult<u64> {
        let rgb = image.to_rgb();
        let gray = luma_plane(&rgb);
        let (w, h) = (rgb.width() as usize, rgb.height() as usize);
        let grid: Vec<u64> = (0..features::HASH_GRID * features::HASH_GRID)
            .into_par_iter()
            .map(|cell| features::cell_mean(&gray, w, h, cell))
            .collect();
        Ok(features::hash_from_grid(&grid))
    }

    fn color_histogram(&self, image: &PixelBuffer, bins: usize) -> EngineResult<Vec<f64>> {
        features::validate_bins(bins)?;
        let rgb = image.to_rgb();
        let counts = rgb
            .data()
            .par_chunks(3 * HISTOGRAM_CHUNK)
            .fold(
                || vec![0u64; 3 * bins],
                |mut acc, chunk| {
                    features::accumulate_counts(&mut acc, chunk, bins);
                    acc
                },
            )
            .reduce(
                || vec![0u64; 3 * bins],
                |mut a, b| {
                    a.iter_mut().zip(b).for_each(|(x, y)| *x += y);
                    a
                },
            );
        Ok(features::normalize_counts(&counts, rgb.pixel_count()))
    }

    fn edge_density(&self, image: &PixelBuffer, threshold: f64) -> EngineResult<f64> {
        features::validate_threshold(threshold)?;
        let (w, h) = (image.width() as usize, image.height() as usize);
        if w < 3 || h < 3 {
            return Ok(0.0);
        }
        let gray = grayscale(&image.to_rgb());
        let edges: u64 = (1..h - 1)
            .into_par_iter()
            .map(|y| features::row_edge_count(&gray, w, y, threshold))
            .sum();
        Ok(features::edge_ratio(edges, w, h))
    }

    fn upscale(&self, image: &PixelBuffer, factor: u32) -> EngineResult<PixelBuffer> {
        let plan = build_plan(image.plan_size(), factor)?;
        if factor == 1 {
            return Ok(image.clone());
        }
        let data = upscale_lanczos_vec(image.data(), image.channels(), &plan)
            .map_err(|e| EngineError::backend(self.name(), "upscale", e))?;
        PixelBuffer::new(plan.out.w, plan.out.h, image.channels(), data)
    }

    fn trace(&self, image: &PixelBuffer, params: &TraceParams) -> EngineResult<TraceOutcome> {
        let rgb = image.to_rgb();
        let (map, kept) = trace::quantize_regions(&rgb, params);
        let paths = kept
            .par_iter()
            .map(|&label| trace::region_path(&map, label, params))
            .collect();
        Ok(trace::finish(rgb.width(), rgb.height(), paths))
    }

    fn batch_perceptual_hash(&self, images: &[PixelBuffer]) -> Vec<EngineResult<u64>> {
        images.par_iter().map(|image| self.perceptual_hash(image)).collect()
    }

    fn batch_color_histogram(&self, images: &[PixelBuffer], bins: usize) -> Vec<EngineResult<Vec<f64>>> {
        images.par_iter().map(|image| self.color_histogram(image, bins)).collect()
    }

    fn batch_trace(&self, images: &[PixelBuffer], params: &TraceParams) -> Vec<EngineResult<TraceOutcome>> {
        images.par_iter().map(|image| self.trace(image, params)).collect()
    }
}
