use meshfix_geom::Aabb2;
use std::collections::BTreeMap;

/// Hard ceiling on bins per axis.
const MAX_BINS: usize = 4096;

/// Uniform bin grid over per-cell bounding boxes.
///
/// A cell is registered in every bin its box touches, so two boxes that
/// overlap always share a bin. Only occupied bins are stored.
#[derive(Debug, Clone, Default)]
pub struct SpatialGrid {
    boxes: Vec<Aabb2>,
    bins: BTreeMap<(usize, usize), Vec<usize>>,
    n: usize,
    origin: [f64; 2],
    step: [f64; 2],
}

impl SpatialGrid {
    /// `bins` per axis, clamped to `1..=min(cells, 4096)`.
    pub fn build(boxes: &[Aabb2], bins: usize) -> Self {
        let Some(extent) = boxes.iter().copied().reduce(|a, b| a.union(&b)) else {
            return Self {
                n: 1,
                step: [1.0, 1.0],
                ..Self::default()
            };
        };

        let n = bins.clamp(1, boxes.len().min(MAX_BINS));
        let mut grid = Self {
            boxes: boxes.to_vec(),
            bins: BTreeMap::new(),
            n,
            origin: extent.min,
            step: [extent.width() / n as f64, extent.height() / n as f64],
        };

        for (cid, bb) in boxes.iter().enumerate() {
            let (ix0, iy0) = grid.bin_of(bb.min);
            let (ix1, iy1) = grid.bin_of(bb.max);
            for ix in ix0..=ix1 {
                for iy in iy0..=iy1 {
                    grid.bins.entry((ix, iy)).or_default().push(cid);
                }
            }
        }
        grid
    }

    fn bin_of(&self, p: [f64; 2]) -> (usize, usize) {
        (
            clamp_bin(p[0], self.origin[0], self.step[0], self.n),
            clamp_bin(p[1], self.origin[1], self.step[1], self.n),
        )
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn bins_per_axis(&self) -> usize {
        self.n
    }

    pub fn occupied_bins(&self) -> usize {
        self.bins.len()
    }

    /// Cells `j > cid` whose boxes overlap `cid`'s box, ascending.
    pub fn neighbors(&self, cid: usize) -> Vec<usize> {
        let Some(bb) = self.boxes.get(cid) else {
            return Vec::new();
        };
        let (ix0, iy0) = self.bin_of(bb.min);
        let (ix1, iy1) = self.bin_of(bb.max);

        let mut out = Vec::new();
        for ix in ix0..=ix1 {
            for iy in iy0..=iy1 {
                let Some(bin) = self.bins.get(&(ix, iy)) else {
                    continue;
                };
                out.extend(
                    bin.iter()
                        .copied()
                        .filter(|&j| j > cid && bb.overlaps(&self.boxes[j])),
                );
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }
}

/// Bin index along one axis. NaN lands in bin 0, infinities in the end bins.
fn clamp_bin(v: f64, origin: f64, step: f64, n: usize) -> usize {
    let step = if step.is_finite() && step > 0.0 { step } else { 1.0 };
    let t = ((v - origin) / step).floor();
    if t.is_nan() {
        return 0;
    }
    let hi = n.saturating_sub(1);
    t.clamp(0.0, hi as f64) as usize
}
