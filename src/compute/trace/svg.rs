//! SVG document assembly for traced paths.

use std::fmt::Write;

use super::outline::Point;

/// A closed, filled path.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgPath {
    pub data: String,
    pub fill: [u8; 3],
}

/// `M x y L ... Z` through every point.
pub fn polygon_data(points: &[Point]) -> String {
    let mut d = String::with_capacity(points.len() * 12);
    for (i, &(x, y)) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{}{} {} ", cmd, num(x), num(y));
    }
    d.push('Z');
    d
}

/// Quadratic smoothing: each vertex becomes the control point of a curve
/// between the midpoints of its two edges.
pub fn spline_data(points: &[Point]) -> String {
    if points.len() < 3 {
        return polygon_data(points);
    }
    let n = points.len();
    let mid = |a: Point, b: Point| ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
    let start = mid(points[n - 1], points[0]);
    let mut d = String::with_capacity(n * 24);
    let _ = write!(d, "M{} {} ", num(start.0), num(start.1));
    for i in 0..n {
        let control = points[i];
        let end = mid(control, points[(i + 1) % n]);
        let _ = write!(
            d,
            "Q{} {} {} {} ",
            num(control.0),
            num(control.1),
            num(end.0),
            num(end.1)
        );
    }
    d.push('Z');
    d
}

/// Wrap paths into a standalone SVG document sized to the source image.
pub fn document(width: u32, height: u32, paths: &[SvgPath]) -> String {
    let mut svg = String::with_capacity(128 + paths.iter().map(|p| p.data.len() + 48).sum::<usize>());
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = width,
        h = height
    );
    for path in paths {
        let [r, g, b] = path.fill;
        let _ = writeln!(svg, "<path d=\"{}\" fill=\"#{:02x}{:02x}{:02x}\"/>", path.data, r, g, b);
    }
    svg.push_str("</svg>\n");
    svg
}

// Two decimals at most; integral values print without a fraction.
fn num(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
