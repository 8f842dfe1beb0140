//! # Vector Tracer
//!
//! Raster to SVG conversion in two flavours:
//!
//! - **Region tracer** (accelerated backend): colours are quantized into
//!   connected regions, each region's outline is followed and simplified, and
//!   the outline is filled with the region's mean colour.
//! - **Edge tracer** (portable backend): a Sobel edge mask is split into
//!   connected contours and every contour becomes one filled path.
//!
//! Both return [`TraceOutcome::Empty`] rather than an error when nothing was
//! traced, e.g. for a flat image under the edge tracer.

pub mod outline;
pub mod regions;
pub mod svg;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::compute::features;
use crate::core::PixelBuffer;
use crate::error::EngineError;

use outline::{simplify_closed, trace_outline, Point};
use regions::{label_regions, LabelMap};
use svg::SvgPath;

/// Tracing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceMode {
    /// Colour fills with smoothed outlines.
    #[default]
    Color,
    /// Black and white fills by luminance.
    Binary,
    /// Colour fills, quadratic-curve outlines.
    Spline,
    /// Colour fills, straight-segment outlines.
    Polygon,
    /// Colour fills, raw pixel-edge outlines.
    None,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Curve {
    Spline,
    Polygon,
    Pixel,
}

impl TraceMode {
    fn curve(self) -> Curve {
        match self {
            TraceMode::Color | TraceMode::Binary | TraceMode::Spline => Curve::Spline,
            TraceMode::Polygon => Curve::Polygon,
            TraceMode::None => Curve::Pixel,
        }
    }
}

impl FromStr for TraceMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "color" | "colour" => Ok(Self::Color),
            "binary" => Ok(Self::Binary),
            "spline" => Ok(Self::Spline),
            "polygon" => Ok(Self::Polygon),
            "none" => Ok(Self::None),
            other => Err(EngineError::invalid_input(
                "mode",
                "must be one of color, binary, spline, polygon, none",
                other,
            )),
        }
    }
}

impl fmt::Display for TraceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TraceMode::Color => "color",
            TraceMode::Binary => "binary",
            TraceMode::Spline => "spline",
            TraceMode::Polygon => "polygon",
            TraceMode::None => "none",
        };
        f.write_str(name)
    }
}

/// Tracer parameters. `threshold` trades detail for size: lower keeps more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TraceParams {
    pub threshold: u8,
    pub mode: TraceMode,
}

impl Default for TraceParams {
    fn default() -> Self {
        Self {
            threshold: 25,
            mode: TraceMode::Color,
        }
    }
}

/// Result of tracing one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceOutcome {
    /// A complete SVG document.
    Document(String),
    /// Nothing was traced.
    Empty,
}

impl TraceOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, TraceOutcome::Empty)
    }

    pub fn document(&self) -> Option<&str> {
        match self {
            TraceOutcome::Document(svg) => Some(svg),
            TraceOutcome::Empty => None,
        }
    }
}

/// A traced path with the area used for paint order.
pub(crate) struct RankedPath {
    pub area: usize,
    pub label: u32,
    pub path: SvgPath,
}

/// Quantize `rgb` and label its regions. Returns the map and the labels worth tracing.
pub(crate) fn quantize_regions(rgb: &PixelBuffer, params: &TraceParams) -> (LabelMap, Vec<u32>) {
    let width = rgb.width() as usize;
    let height = rgb.height() as usize;
    let step = params.threshold.max(1) as u32;
    let keys: Vec<u32> = rgb
        .data()
        .chunks_exact(3)
        .map(|px| match params.mode {
            TraceMode::Binary => (features::luma(px) < 128.0) as u32,
            _ => (px[0] as u32 / step) << 16 | (px[1] as u32 / step) << 8 | (px[2] as u32 / step),
        })
        .collect();
    let map = label_regions(&keys, width, height, rgb.data());
    let min_area = 1 + params.threshold as usize / 32;
    let kept = map
        .regions
        .iter()
        .enumerate()
        .filter(|(_, region)| region.area >= min_area)
        .map(|(label, _)| label as u32)
        .collect();
    (map, kept)
}

/// Outline, simplify and colour one quantized region.
pub(crate) fn region_path(map: &LabelMap, label: u32, params: &TraceParams) -> RankedPath {
    let region = &map.regions[label as usize];
    let fill = match params.mode {
        TraceMode::Binary if region.key == 1 => [0, 0, 0],
        TraceMode::Binary => [255, 255, 255],
        _ => region.mean_color(),
    };
    let outline = trace_outline(map, label);
    RankedPath {
        area: region.area,
        label,
        path: SvgPath {
            data: shape(&outline, params.mode.curve(), 0.75),
            fill,
        },
    }
}

/// Edge-mask contours of `rgb`, in label order.
pub(crate) fn edge_paths(rgb: &PixelBuffer, params: &TraceParams) -> Vec<RankedPath> {
    let width = rgb.width() as usize;
    let height = rgb.height() as usize;
    if width < 3 || height < 3 {
        return Vec::new();
    }
    let gray: Vec<f64> = rgb.data().chunks_exact(3).map(features::luma).collect();
    let threshold = params.threshold as f64;
    let mut mask = vec![0u32; width * height];
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if features::sobel_magnitude(&gray, width, x, y) > threshold {
                mask[y * width + x] = 1;
            }
        }
    }

    let map = label_regions(&mask, width, height, rgb.data());
    map.regions
        .iter()
        .enumerate()
        .filter(|(_, region)| region.key == 1 && region.area >= 2)
        .map(|(label, region)| {
            let label = label as u32;
            let outline = trace_outline(&map, label);
            let fill = if params.mode == TraceMode::Color {
                let (x, y) = outline.first().copied().unwrap_or((0.0, 0.0));
                let x = (x as u32).min(rgb.width() - 1);
                let y = (y as u32).min(rgb.height() - 1);
                rgb.pixel(x, y).map_or([0, 0, 0], |px| [px[0], px[1], px[2]])
            } else {
                [0, 0, 0]
            };
            RankedPath {
                area: region.area,
                label,
                path: SvgPath {
                    data: shape(&outline, params.mode.curve(), 1.0),
                    fill,
                },
            }
        })
        .collect()
}

/// Paint large paths first so smaller ones stay visible, then wrap the document.
pub(crate) fn finish(width: u32, height: u32, mut paths: Vec<RankedPath>) -> TraceOutcome {
    if paths.is_empty() {
        return TraceOutcome::Empty;
    }
    paths.sort_by(|a, b| b.area.cmp(&a.area).then(a.label.cmp(&b.label)));
    let paths: Vec<SvgPath> = paths.into_iter().map(|ranked| ranked.path).collect();
    TraceOutcome::Document(svg::document(width, height, &paths))
}

fn shape(outline: &[Point], curve: Curve, epsilon: f64) -> String {
    match curve {
        Curve::Pixel => svg::polygon_data(outline),
        Curve::Polygon => svg::polygon_data(&simplify_closed(outline, epsilon)),
        Curve::Spline => svg::spline_data(&simplify_closed(outline, epsilon / 2.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tone() -> PixelBuffer {
        // left half red, right half blue, 8x4
        let mut data = Vec::new();
        for _ in 0..4 {
            for x in 0..8 {
                data.extend_from_slice(if x < 4 { &[255, 0, 0] } else { &[0, 0, 255] });
            }
        }
        PixelBuffer::new(8, 4, 3, data).unwrap()
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("Polygon".parse::<TraceMode>().unwrap(), TraceMode::Polygon);
        assert_eq!("none".parse::<TraceMode>().unwrap(), TraceMode::None);
        assert!("bezier".parse::<TraceMode>().is_err());
        assert_eq!(TraceMode::Spline.to_string(), "spline");
    }

    #[test]
    fn region_tracer_fills_with_region_colour() {
        let image = two_tone();
        let params = TraceParams::default();
        let (map, kept) = quantize_regions(&image, &params);
        assert_eq!(kept.len(), 2);
        let paths = kept.iter().map(|&l| region_path(&map, l, &params)).collect();
        let svg = finish(8, 4, paths);
        let doc = svg.document().unwrap();
        assert!(doc.contains("#ff0000"));
        assert!(doc.contains("#0000ff"));
    }

    #[test]
    fn binary_mode_paints_black_and_white() {
        let image = two_tone();
        let params = TraceParams {
            threshold: 25,
            mode: TraceMode::Binary,
        };
        let (map, kept) = quantize_regions(&image, &params);
        let paths = kept.iter().map(|&l| region_path(&map, l, &params)).collect();
        let doc = finish(8, 4, paths);
        let doc = doc.document().unwrap();
        // red (luma 76) and blue (luma 29) are both dark
        assert!(doc.contains("#000000"));
        assert!(!doc.contains("#ff0000"));
    }

    #[test]
    fn edge_tracer_finds_boundary_and_skips_flat() {
        let params = TraceParams::default();
        assert!(!edge_paths(&two_tone(), &params).is_empty());
        let flat = PixelBuffer::filled(8, 8, &[10, 20, 30]).unwrap();
        assert!(edge_paths(&flat, &params).is_empty());
        assert!(finish(8, 8, Vec::new()).is_empty());
    }

    #[test]
    fn larger_paths_paint_first() {
        let small = RankedPath {
            area: 1,
            label: 0,
            path: SvgPath {
                data: "M0 0 Z".into(),
                fill: [1, 1, 1],
            },
        };
        let large = RankedPath {
            area: 9,
            label: 1,
            path: SvgPath {
                data: "M0 0 Z".into(),
                fill: [2, 2, 2],
            },
        };
        let doc = finish(3, 3, vec![small, large]);
        let doc = doc.document().unwrap();
        assert!(doc.find("#020202").unwrap() < doc.find("#010101").unwrap());
    }
}
