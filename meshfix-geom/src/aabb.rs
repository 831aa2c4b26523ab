use crate::Point2;

/// Axis-aligned bounding box in the XY plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb2 {
    pub min: Point2,
    pub max: Point2,
}

impl Aabb2 {
    /// Corners are normalized so `min <= max` on both axes.
    pub fn new(a: Point2, b: Point2) -> Self {
        Self {
            min: [a[0].min(b[0]), a[1].min(b[1])],
            max: [a[0].max(b[0]), a[1].max(b[1])],
        }
    }

    /// Smallest box containing every point, or `None` for no points.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point2>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bb = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bb.expand_to_include(p);
        }
        Some(bb)
    }

    pub fn expand_to_include(&mut self, p: Point2) {
        self.min = [self.min[0].min(p[0]), self.min[1].min(p[1])];
        self.max = [self.max[0].max(p[0]), self.max[1].max(p[1])];
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: [self.min[0].min(other.min[0]), self.min[1].min(other.min[1])],
            max: [self.max[0].max(other.max[0]), self.max[1].max(other.max[1])],
        }
    }

    /// Closed-interval overlap test; boxes that only touch overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        !(self.max[0] < other.min[0]
            || other.max[0] < self.min[0]
            || self.max[1] < other.min[1]
            || other.max[1] < self.min[1])
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    /// `[xmin, xmax, ymin, ymax]`, the layout mesh readers report.
    pub fn to_extents(&self) -> [f64; 4] {
        [self.min[0], self.max[0], self.min[1], self.max[1]]
    }

    pub fn from_extents(e: [f64; 4]) -> Self {
        Self::new([e[0], e[2]], [e[1], e[3]])
    }
}
