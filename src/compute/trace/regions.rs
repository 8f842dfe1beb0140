//! Connected-region labelling over a per-pixel key plane.

/// One 4-connected run of pixels sharing a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub key: u32,
    pub area: usize,
    /// First pixel of the region in raster order.
    pub start: (usize, usize),
    /// Per-channel RGB sums, for the mean fill colour.
    pub sum: [u64; 3],
}

impl Region {
    pub fn mean_color(&self) -> [u8; 3] {
        let n = self.area.max(1) as u64;
        [
            ((self.sum[0] + n / 2) / n) as u8,
            ((self.sum[1] + n / 2) / n) as u8,
            ((self.sum[2] + n / 2) / n) as u8,
        ]
    }
}

/// Label plane plus the regions it indexes.
#[derive(Debug, Clone)]
pub struct LabelMap {
    pub width: usize,
    pub height: usize,
    pub labels: Vec<u32>,
    pub regions: Vec<Region>,
}

impl LabelMap {
    /// Whether pixel `(x, y)` belongs to region `label`. Out-of-bounds is outside.
    #[inline]
    pub fn contains(&self, x: i64, y: i64, label: u32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.labels[y as usize * self.width + x as usize] == label
    }
}

/// Flood-fill `keys` into 4-connected regions. `rgb` supplies colour sums.
pub fn label_regions(keys: &[u32], width: usize, height: usize, rgb: &[u8]) -> LabelMap {
    const UNSET: u32 = u32::MAX;
    let mut labels = vec![UNSET; width * height];
    let mut regions = Vec::new();
    let mut stack = Vec::new();

    for seed in 0..labels.len() {
        if labels[seed] != UNSET {
            continue;
        }
        let id = regions.len() as u32;
        let key = keys[seed];
        let mut region = Region {
            key,
            area: 0,
            start: (seed % width, seed / width),
            sum: [0; 3],
        };
        labels[seed] = id;
        stack.push(seed);

        while let Some(idx) = stack.pop() {
            region.area += 1;
            let px = &rgb[idx * 3..idx * 3 + 3];
            region.sum[0] += px[0] as u64;
            region.sum[1] += px[1] as u64;
            region.sum[2] += px[2] as u64;

            let (x, y) = (idx % width, idx / width);
            let mut visit = |n: usize| {
                if labels[n] == UNSET && keys[n] == key {
                    labels[n] = id;
                    stack.push(n);
                }
            };
            if x > 0 {
                visit(idx - 1);
            }
            if x + 1 < width {
                visit(idx + 1);
            }
            if y > 0 {
                visit(idx - width);
            }
            if y + 1 < height {
                visit(idx + width);
            }
        }
        regions.push(region);
    }

    LabelMap {
        width,
        height,
        labels,
        regions,
    }
}
