//! # Feature Kernels
//!
//! Per-pixel and per-cell arithmetic shared by both backends. The backends
//! differ only in how they schedule these kernels (rayon vs a plain loop), so
//! hashes, histograms and edge counts come out identical whichever backend
//! ran. Every kernel works on integers or sums in a fixed order for that reason.
//!
//! Also home to the similarity helpers that work on finished features:
//! [`hamming_distance`], [`find_duplicate_groups`], [`histogram_intersection`].

use crate::error::{EngineError, EngineResult};

/// Side of the perceptual hash grid.
pub const HASH_GRID: usize = 8;

/// ITU-R BT.601 luma of an RGB pixel.
#[inline]
pub fn luma(px: &[u8]) -> f64 {
    0.299 * px[0] as f64 + 0.587 * px[1] as f64 + 0.114 * px[2] as f64
}

/// Half-open span of pixels covered by grid cell `index` out of `cells`.
///
/// Every cell covers at least one pixel, so images narrower than the grid
/// sample their pixels repeatedly instead of producing empty cells.
#[inline]
pub fn cell_span(index: usize, cells: usize, len: usize) -> (usize, usize) {
    let start = ((index * len) / cells).min(len - 1);
    let end = (((index + 1) * len) / cells).max(start + 1).min(len);
    (start, end)
}

/// BT.601 luma in thousandths, `299R + 587G + 114B`. Hash cells are compared
/// in this scale, exactly.
#[inline]
pub fn luma_fixed(px: &[u8]) -> u64 {
    299 * px[0] as u64 + 587 * px[1] as u64 + 114 * px[2] as u64
}

/// Area average of one hash grid cell over a fixed-point luma plane, rounded down.
pub fn cell_mean(gray: &[u64], width: usize, height: usize, cell: usize) -> u64 {
    let (x0, x1) = cell_span(cell % HASH_GRID, HASH_GRID, width);
    let (y0, y1) = cell_span(cell / HASH_GRID, HASH_GRID, height);
    let mut sum = 0u64;
    for y in y0..y1 {
        let row = &gray[y * width..(y + 1) * width];
        sum += row[x0..x1].iter().sum::<u64>();
    }
    sum / ((x1 - x0) * (y1 - y0)) as u64
}

/// Fold the 64 cell means into the hash: bit `i` is set when cell `i` is
/// strictly brighter than the grid mean, compared as `64 * v > sum`.
pub fn hash_from_grid(grid: &[u64]) -> u64 {
    debug_assert_eq!(grid.len(), HASH_GRID * HASH_GRID);
    let total: u64 = grid.iter().sum();
    let cells = grid.len() as u64;
    grid.iter()
        .enumerate()
        .filter(|&(_, &v)| v * cells > total)
        .fold(0u64, |hash, (i, _)| hash | (1u64 << i))
}

/// Number of differing bits between two hashes, in `0..=64`.
#[inline]
pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// Group near-identical images.
///
/// Walks the hashes in order; an index joins the first open group whose
/// leading hash lies within `max_distance`, otherwise it starts a new group.
/// Only groups with two or more members are returned.
pub fn find_duplicate_groups(hashes: &[u64], max_distance: u32) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (index, &hash) in hashes.iter().enumerate() {
        match groups
            .iter_mut()
            .find(|group| hamming_distance(hashes[group[0]], hash) <= max_distance)
        {
            Some(group) => group.push(index),
            None => groups.push(vec![index]),
        }
    }
    groups.retain(|group| group.len() > 1);
    groups
}

pub fn validate_bins(bins: usize) -> EngineResult<()> {
    if !(1..=256).contains(&bins) {
        return Err(EngineError::invalid_input("bins", "must be between 1 and 256", bins));
    }
    Ok(())
}

/// Equal-width bucket for an 8-bit value: `min(floor(v / (256 / bins)), bins - 1)`.
#[inline]
pub fn bucket_index(value: u8, bins: usize) -> usize {
    ((value as usize * bins) / 256).min(bins - 1)
}

/// Accumulate channel-major bucket counts (`3 * bins`) for RGB pixels.
pub fn accumulate_counts(counts: &mut [u64], rgb: &[u8], bins: usize) {
    for px in rgb.chunks_exact(3) {
        counts[bucket_index(px[0], bins)] += 1;
        counts[bins + bucket_index(px[1], bins)] += 1;
        counts[2 * bins + bucket_index(px[2], bins)] += 1;
    }
}

/// Turn raw counts into per-channel frequencies; each channel sums to 1.0.
pub fn normalize_counts(counts: &[u64], pixels: usize) -> Vec<f64> {
    let total = pixels.max(1) as f64;
    counts.iter().map(|&c| c as f64 / total).collect()
}

/// Similarity of two channel-major histograms of equal length, in `[0, 1]`.
///
/// Sums the bucket-wise minimum per channel and averages the three channels.
pub fn histogram_intersection(a: &[f64], b: &[f64]) -> EngineResult<f64> {
    if a.len() != b.len() || a.is_empty() || a.len() % 3 != 0 {
        return Err(EngineError::invalid_input(
            "histograms",
            "must be non-empty, of equal length and a multiple of 3",
            format!("{} vs {}", a.len(), b.len()),
        ));
    }
    let shared: f64 = a.iter().zip(b).map(|(x, y)| x.min(*y)).sum();
    Ok((shared / 3.0).clamp(0.0, 1.0))
}

/// Sobel gradient magnitude at an interior pixel of a grayscale plane.
#[inline]
pub fn sobel_magnitude(gray: &[f64], width: usize, x: usize, y: usize) -> f64 {
    let at = |dx: usize, dy: usize| gray[(y + dy - 1) * width + (x + dx - 1)];
    let gx = (at(2, 0) + 2.0 * at(2, 1) + at(2, 2)) - (at(0, 0) + 2.0 * at(0, 1) + at(0, 2));
    let gy = (at(0, 2) + 2.0 * at(1, 2) + at(2, 2)) - (at(0, 0) + 2.0 * at(1, 0) + at(2, 0));
    (gx * gx + gy * gy).sqrt()
}

/// Edge pixels in interior row `y`.
pub fn row_edge_count(gray: &[f64], width: usize, y: usize, threshold: f64) -> u64 {
    (1..width - 1)
        .filter(|&x| sobel_magnitude(gray, width, x, y) > threshold)
        .count() as u64
}

/// Fraction of interior pixels that are edges.
#[inline]
pub fn edge_ratio(edges: u64, width: usize, height: usize) -> f64 {
    edges as f64 / ((width - 2) * (height - 2)) as f64
}

pub fn validate_threshold(threshold: f64) -> EngineResult<()> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(EngineError::invalid_input(
            "threshold",
            "must be a finite, non-negative number",
            threshold,
        ));
    }
    Ok(())
}

/// 256-bucket histogram of the alpha channel of RGBA data.
pub fn alpha_histogram(rgba: &[u8]) -> [u64; 256] {
    let mut histogram = [0u64; 256];
    for px in rgba.chunks_exact(4) {
        histogram[px[3] as usize] += 1;
    }
    histogram
}
