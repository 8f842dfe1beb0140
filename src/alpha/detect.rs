//! Alpha channel analysis.

use serde::Serialize;

use crate::compute::features::alpha_histogram;
use crate::core::PixelBuffer;
use crate::error::{EngineError, EngineResult};

/// Share of all pixels a value needs to count as dominant.
const DOMINANT_SHARE: f64 = 0.01;
const MAX_DOMINANT: usize = 10;
const BINARY_SEMI_RATIO: f64 = 0.05;
const GRADIENT_SEMI_RATIO: f64 = 0.1;

/// Coarse description of an alpha distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlphaPattern {
    Binary,
    ThreeLevel,
    Gradient,
    MostlyTransparent,
    MostlyOpaque,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport {
    pub unique_values: usize,
    /// `(value, count)` for values above 1% of the image, lowest value first, at most 10.
    pub dominant_values: Vec<(u8, u64)>,
    pub has_transparency: bool,
    pub has_semi_transparency: bool,
    pub transparent_pixels: u64,
    pub opaque_pixels: u64,
    pub semi_transparent_pixels: u64,
    pub transparency_ratio: f64,
    pub opacity_ratio: f64,
    pub semi_transparency_ratio: f64,
    pub is_binary: bool,
    pub patterns: Vec<AlphaPattern>,
    /// 256 buckets, one per alpha value.
    pub histogram: Vec<u64>,
    pub alpha_min: u8,
    pub alpha_max: u8,
    pub alpha_mean: f64,
    pub alpha_median: f64,
}

impl DetectionReport {
    pub fn has_pattern(&self, pattern: AlphaPattern) -> bool {
        self.patterns.contains(&pattern)
    }
}

/// Analyse the alpha plane of an RGBA buffer.
pub fn detect_alpha(image: &PixelBuffer) -> EngineResult<DetectionReport> {
    if !image.has_alpha() {
        return Err(EngineError::invalid_input(
            "channels",
            "alpha detection needs an RGBA buffer",
            image.channels(),
        ));
    }
    let histogram = alpha_histogram(image.data());
    let total = image.pixel_count() as u64;
    let total_f = total as f64;

    let threshold = total_f * DOMINANT_SHARE;
    let dominant: Vec<(u8, u64)> = histogram
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count as f64 > threshold)
        .map(|(value, &count)| (value as u8, count))
        .collect();

    let transparent = histogram[0];
    let opaque = histogram[255];
    let semi = total - transparent - opaque;
    let transparency_ratio = transparent as f64 / total_f;
    let opacity_ratio = opaque as f64 / total_f;
    let semi_ratio = semi as f64 / total_f;
    let is_binary = semi_ratio < BINARY_SEMI_RATIO;

    let mut patterns = Vec::new();
    if is_binary {
        patterns.push(AlphaPattern::Binary);
    }
    if dominant.len() == 3 {
        patterns.push(AlphaPattern::ThreeLevel);
    }
    if semi > 0 && semi_ratio > GRADIENT_SEMI_RATIO {
        patterns.push(AlphaPattern::Gradient);
    }
    if transparency_ratio > 0.5 {
        patterns.push(AlphaPattern::MostlyTransparent);
    } else if opacity_ratio > 0.9 {
        patterns.push(AlphaPattern::MostlyOpaque);
    }

    let present = |(value, &count): (usize, &u64)| (count > 0).then_some(value as u8);
    let alpha_min = histogram.iter().enumerate().find_map(present).unwrap_or(0);
    let alpha_max = histogram.iter().enumerate().rev().find_map(present).unwrap_or(0);
    let sum: u64 = histogram
        .iter()
        .enumerate()
        .map(|(value, &count)| value as u64 * count)
        .sum();

    Ok(DetectionReport {
        unique_values: histogram.iter().filter(|&&count| count > 0).count(),
        dominant_values: dominant.into_iter().take(MAX_DOMINANT).collect(),
        has_transparency: opaque < total,
        has_semi_transparency: semi > 0,
        transparent_pixels: transparent,
        opaque_pixels: opaque,
        semi_transparent_pixels: semi,
        transparency_ratio,
        opacity_ratio,
        semi_transparency_ratio: semi_ratio,
        is_binary,
        patterns,
        alpha_min,
        alpha_max,
        alpha_mean: sum as f64 / total_f,
        alpha_median: median(&histogram, total),
        histogram: histogram.to_vec(),
    })
}

/// Median from a histogram; even counts average the two middle values.
fn median(histogram: &[u64; 256], total: u64) -> f64 {
    let nth = |rank: u64| {
        let mut seen = 0;
        for (value, &count) in histogram.iter().enumerate() {
            seen += count;
            if seen > rank {
                return value as f64;
            }
        }
        255.0
    };
    (nth((total - 1) / 2) + nth(total / 2)) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_alpha(alpha: &[u8]) -> PixelBuffer {
        let data = alpha.iter().flat_map(|&a| [10, 20, 30, a]).collect();
        PixelBuffer::new(alpha.len() as u32, 1, 4, data).unwrap()
    }

    #[test]
    fn binary_mostly_transparent() {
        let mut alpha = vec![0u8; 60];
        alpha.extend([255u8; 40]);
        let report = detect_alpha(&with_alpha(&alpha)).unwrap();
        assert!(report.is_binary);
        assert_eq!(report.patterns, vec![AlphaPattern::Binary, AlphaPattern::MostlyTransparent]);
        assert_eq!(report.dominant_values, vec![(0, 60), (255, 40)]);
        assert_eq!(report.unique_values, 2);
        assert_eq!((report.alpha_min, report.alpha_max), (0, 255));
        assert_eq!(report.alpha_median, 0.0);
    }

    #[test]
    fn three_levels_with_gradient() {
        let mut alpha = vec![0u8; 30];
        alpha.extend([128u8; 30]);
        alpha.extend([255u8; 40]);
        let report = detect_alpha(&with_alpha(&alpha)).unwrap();
        assert!(!report.is_binary);
        assert!(report.has_pattern(AlphaPattern::ThreeLevel));
        assert!(report.has_pattern(AlphaPattern::Gradient));
        assert!(!report.has_pattern(AlphaPattern::MostlyOpaque));
        assert_eq!(report.semi_transparent_pixels, 30);
        assert_eq!(report.alpha_median, 128.0);
    }

    #[test]
    fn fully_opaque_image() {
        let report = detect_alpha(&with_alpha(&[255; 16])).unwrap();
        assert!(!report.has_transparency);
        assert_eq!(report.patterns, vec![AlphaPattern::Binary, AlphaPattern::MostlyOpaque]);
        assert_eq!(report.alpha_mean, 255.0);
        assert_eq!(report.histogram.len(), 256);
    }

    #[test]
    fn median_averages_middle_pair() {
        let report = detect_alpha(&with_alpha(&[10, 20])).unwrap();
        assert_eq!(report.alpha_median, 15.0);
    }

    #[test]
    fn rgb_is_rejected() {
        let rgb = PixelBuffer::filled(2, 2, &[0, 0, 0]).unwrap();
        assert_eq!(detect_alpha(&rgb).unwrap_err().category(), "invalid_input");
    }
}
