//! # Portable Backend
//!
//! Single-threaded implementations built only on the `image` crate and the
//! shared feature kernels. Always available; the dispatcher falls back here.
//!
//! Hashes, histograms and edge densities match the accelerated backend
//! exactly. The upscaler (cubic + sharpening) and tracer (edge contours) are
//! lower-quality approximations of their accelerated counterparts.

use tex_scale::portable::upscale_cubic_enhanced;
use tex_scale::presets::build_plan;

use crate::compute::backend::ComputeBackend;
use crate::compute::features;
use crate::compute::trace::{self, TraceOutcome, TraceParams};
use crate::core::PixelBuffer;
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Default, Clone, Copy)]
pub struct PortableBackend;

impl PortableBackend {
    pub fn new() -> Self {
        Self
    }
}

fn grayscale(rgb: &PixelBuffer) -> Vec<f64> {
    rgb.data().chunks_exact(3).map(features::luma).collect()
}

fn luma_plane(rgb: &PixelBuffer) -> Vec<u64> {
    rgb.data().chunks_exact(3).map(features::luma_fixed).collect()
}

impl ComputeBackend for PortableBackend {
    fn name(&self) -> &'static str {
        "portable"
    }

    fn perceptual_hash(&self, image: &PixelBuffer) -> EngineResult<u64> {
        let rgb = image.to_rgb();
        let gray = luma_plane(&rgb);
        let (w, h) = (rgb.width() as usize, rgb.height() as usize);
        let grid: Vec<u64> = (0..features::HASH_GRID * features::HASH_GRID)
            .map(|cell| features::cell_mean(&gray, w, h, cell))
            .collect();
        Ok(features::hash_from_grid(&grid))
    }

    fn color_histogram(&self, image: &PixelBuffer, bins: usize) -> EngineResult<Vec<f64>> {
        features::validate_bins(bins)?;
        let rgb = image.to_rgb();
        let mut counts = vec![0u64; 3 * bins];
        features::accumulate_counts(&mut counts, rgb.data(), bins);
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
            .map(|y| features::row_edge_count(&gray, w, y, threshold))
            .sum();
        Ok(features::edge_ratio(edges, w, h))
    }

    fn upscale(&self, image: &PixelBuffer, factor: u32) -> EngineResult<PixelBuffer> {
        let plan = build_plan(image.plan_size(), factor)?;
        if factor == 1 {
            return Ok(image.clone());
        }
        let data = upscale_cubic_enhanced(image.data(), image.channels(), &plan)
            .map_err(|e| EngineError::backend(self.name(), "upscale", e))?;
        PixelBuffer::new(plan.out.w, plan.out.h, image.channels(), data)
    }

    fn trace(&self, image: &PixelBuffer, params: &TraceParams) -> EngineResult<TraceOutcome> {
        let rgb = image.to_rgb();
        let paths = trace::edge_paths(&rgb, params);
        Ok(trace::finish(rgb.width(), rgb.height(), paths))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> PixelBuffer {
        let data = (0..w * h)
            .flat_map(|i| {
                let v = ((i % w) * 255 / (w - 1)) as u8;
                [v, v, v]
            })
            .collect();
        PixelBuffer::new(w, h, 3, data).unwrap()
    }

    #[test]
    fn histogram_channels_sum_to_one() {
        let hist = PortableBackend.color_histogram(&gradient(16, 4), 8).unwrap();
        assert_eq!(hist.len(), 24);
        for channel in hist.chunks(8) {
            assert!((channel.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn histogram_rejects_bad_bins() {
        let image = gradient(4, 4);
        assert!(PortableBackend.color_histogram(&image, 0).is_err());
        assert!(PortableBackend.color_histogram(&image, 257).is_err());
    }

    #[test]
    fn horizontal_gradient_hash_sets_right_half() {
        let hash = PortableBackend.perceptual_hash(&gradient(64, 64)).unwrap();
        // columns 4..8 of every row are brighter than the mean
        let row = 0b1111_0000u64;
        let expected = (0..8).fold(0u64, |acc, r| acc | (row << (8 * r)));
        assert_eq!(hash, expected);
    }

    #[test]
    fn tiny_images_have_no_edges() {
        let image = PixelBuffer::filled(2, 9, &[0, 0, 0]).unwrap();
        assert_eq!(PortableBackend.edge_density(&image, 30.0).unwrap(), 0.0);
    }

    #[test]
    fn upscale_factor_one_copies() {
        let image = gradient(5, 3);
        assert_eq!(PortableBackend.upscale(&image, 1).unwrap(), image);
        assert!(PortableBackend.upscale(&image, 0).is_err());
    }

    #[test]
    fn flat_image_traces_to_empty() {
        let flat = PixelBuffer::filled(16, 16, &[80, 80, 80, 255]).unwrap();
        assert!(PortableBackend.trace(&flat, &TraceParams::default()).unwrap().is_empty());
    }
}
