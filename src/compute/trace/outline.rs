//! Region outlines on the pixel-corner grid, and their simplification.
//!
//! An outline walks the cracks between pixels with the region on its right
//! hand, so a filled outline covers exactly the region's pixels (holes aside).
//! Only corners where the walk turns are kept.

use super::regions::LabelMap;

pub type Point = (f64, f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Heading {
    East,
    South,
    West,
    North,
}

impl Heading {
    fn left(self) -> Self {
        match self {
            Heading::East => Heading::North,
            Heading::North => Heading::West,
            Heading::West => Heading::South,
            Heading::South => Heading::East,
        }
    }

    fn right(self) -> Self {
        match self {
            Heading::East => Heading::South,
            Heading::South => Heading::West,
            Heading::West => Heading::North,
            Heading::North => Heading::East,
        }
    }

    fn step(self, (x, y): (i64, i64)) -> (i64, i64) {
        match self {
            Heading::East => (x + 1, y),
            Heading::South => (x, y + 1),
            Heading::West => (x - 1, y),
            Heading::North => (x, y - 1),
        }
    }
}

/// Outer outline of region `label`, as the corners where the walk turns.
pub fn trace_outline(map: &LabelMap, label: u32) -> Vec<Point> {
    let (sx, sy) = map.regions[label as usize].start;
    let start = (sx as i64, sy as i64);
    let mut pos = start;
    let mut heading = Heading::East;
    let mut corners = vec![(start.0 as f64, start.1 as f64)];
    // Each crack is walked at most once.
    let limit = 4 * (map.width + 1) * (map.height + 1);

    for _ in 0..limit {
        pos = heading.step(pos);
        if pos == start {
            break;
        }
        let next = next_heading(map, label, pos, heading);
        if next != heading {
            corners.push((pos.0 as f64, pos.1 as f64));
        }
        heading = next;
    }
    corners
}

fn next_heading(map: &LabelMap, label: u32, (x, y): (i64, i64), heading: Heading) -> Heading {
    let inside = |px: i64, py: i64| map.contains(px, py, label);
    let (ahead_left, ahead_right) = match heading {
        Heading::East => (inside(x, y - 1), inside(x, y)),
        Heading::South => (inside(x, y), inside(x - 1, y)),
        Heading::West => (inside(x - 1, y), inside(x - 1, y - 1)),
        Heading::North => (inside(x - 1, y - 1), inside(x, y - 1)),
    };
    if ahead_left {
        heading.left()
    } else if ahead_right {
        heading
    } else {
        heading.right()
    }
}

/// Douglas-Peucker simplification of a closed polygon.
///
/// The ring is split at the vertex farthest from the first one and each half
/// is simplified on its own. Rings that would collapse below a triangle are
/// returned unchanged.
pub fn simplify_closed(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() <= 4 {
        return points.to_vec();
    }
    let origin = points[0];
    let far = (1..points.len())
        .max_by(|&a, &b| distance_sq(origin, points[a]).total_cmp(&distance_sq(origin, points[b])))
        .unwrap_or(points.len() / 2);

    let mut out = Vec::with_capacity(points.len());
    douglas_peucker(&points[..=far], epsilon, &mut out);
    out.pop();
    let mut tail: Vec<Point> = points[far..].to_vec();
    tail.push(origin);
    douglas_peucker(&tail, epsilon, &mut out);
    out.pop();

    if out.len() < 3 { points.to_vec() } else { out }
}

/// Appends the simplified open polyline (both endpoints included) to `out`.
fn douglas_peucker(points: &[Point], epsilon: f64, out: &mut Vec<Point>) {
    let last = points.len() - 1;
    let (mut index, mut max) = (0, 0.0);
    for (i, &p) in points.iter().enumerate().take(last).skip(1) {
        let d = segment_distance(p, points[0], points[last]);
        if d > max {
            index = i;
            max = d;
        }
    }
    if max > epsilon {
        douglas_peucker(&points[..=index], epsilon, out);
        out.pop();
        douglas_peucker(&points[index..], epsilon, out);
    } else {
        out.push(points[0]);
        out.push(points[last]);
    }
}

fn distance_sq(a: Point, b: Point) -> f64 {
    (a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let len_sq = distance_sq(a, b);
    if len_sq == 0.0 {
        return distance_sq(p, a).sqrt();
    }
    let t = (((p.0 - a.0) * (b.0 - a.0) + (p.1 - a.1) * (b.1 - a.1)) / len_sq).clamp(0.0, 1.0);
    distance_sq(p, (a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1))).sqrt()
}

#[cfg(test)]
mod tests {
    use super::super::regions::label_regions;
    use super::*;

    #[test]
    fn single_pixel_outline_is_unit_square() {
        let map = label_regions(&[0], 1, 1, &[0, 0, 0]);
        assert_eq!(
            trace_outline(&map, 0),
            vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
        );
    }

    #[test]
    fn l_shape_outline_has_six_corners() {
        // 1 0
        // 1 1
        let keys = [1, 0, 1, 1];
        let map = label_regions(&keys, 2, 2, &[0u8; 12]);
        let outline = trace_outline(&map, 0);
        assert_eq!(
            outline,
            vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (0.0, 2.0)]
        );
    }

    #[test]
    fn inner_region_outline_stays_inside_map() {
        // 0 0 0
        // 0 1 0
        // 0 0 0
        let keys = [0, 0, 0, 0, 1, 0, 0, 0, 0];
        let map = label_regions(&keys, 3, 3, &[0u8; 27]);
        assert_eq!(
            trace_outline(&map, 1),
            vec![(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0)]
        );
    }

    #[test]
    fn simplify_drops_collinear_points() {
        let ring = vec![
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (3.0, 0.0),
            (3.0, 3.0),
            (0.0, 3.0),
            (0.0, 2.0),
            (0.0, 1.0),
        ];
        let simplified = simplify_closed(&ring, 0.5);
        assert_eq!(simplified, vec![(0.0, 0.0), (3.0, 0.0), (3.0, 3.0), (0.0, 3.0)]);
    }
}
