use crate::Point2;

/// Tolerance for barycentric containment tests.
pub const DEFAULT_CONTAINMENT_EPS: f64 = 1e-14;

/// Tolerance for orientation products in segment tests.
pub const DEFAULT_COLLINEAR_EPS: f64 = 1e-12;

const COSINE_FLOOR: f64 = 1e-30;

/// Twice the signed area of the triangle `(a, b, c)`.
///
/// Positive when `c` lies to the left of the directed line `a -> b`.
pub fn orient(a: Point2, b: Point2, c: Point2) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// `w` is collinear with `u -> v` and lies inside its eps-expanded box.
fn on_segment(u: Point2, v: Point2, w: Point2, eps: f64) -> bool {
    orient(u, v, w).abs() <= eps
        && u[0].min(v[0]) - eps <= w[0]
        && w[0] <= u[0].max(v[0]) + eps
        && u[1].min(v[1]) - eps <= w[1]
        && w[1] <= u[1].max(v[1]) + eps
}

/// Segment `p-q` intersects segment `r-s`.
///
/// A proper crossing needs both orientation products strictly below `-eps`.
/// Collinear overlap and touching endpoints also count as intersecting.
pub fn segments_intersect(p: Point2, q: Point2, r: Point2, s: Point2, eps: f64) -> bool {
    let o1 = orient(p, q, r);
    let o2 = orient(p, q, s);
    let o3 = orient(r, s, p);
    let o4 = orient(r, s, q);

    if o1 * o2 < -eps && o3 * o4 < -eps {
        return true;
    }

    on_segment(p, q, r, eps)
        || on_segment(p, q, s, eps)
        || on_segment(r, s, p, eps)
        || on_segment(r, s, q, eps)
}

/// Barycentric point-in-triangle test, inclusive of the boundary within `eps`.
///
/// Degenerate triangles (near-zero determinant) contain nothing.
pub fn point_in_triangle(p: Point2, a: Point2, b: Point2, c: Point2, eps: f64) -> bool {
    let v0 = [c[0] - a[0], c[1] - a[1]];
    let v1 = [b[0] - a[0], b[1] - a[1]];
    let v2 = [p[0] - a[0], p[1] - a[1]];

    let den = v0[0] * v1[1] - v0[1] * v1[0];
    if den.abs() < eps {
        return false;
    }

    let u = (v2[0] * v1[1] - v2[1] * v1[0]) / den;
    let v = (v2[0] * v0[1] - v2[1] * v0[0]) / -den;
    let w = 1.0 - u - v;
    u >= -eps && v >= -eps && w >= -eps
}

/// Quad membership as the union of triangles `(0, 1, 2)` and `(0, 2, 3)`.
pub fn point_in_quad(p: Point2, quad: [Point2; 4], eps: f64) -> bool {
    let [a, b, c, d] = quad;
    point_in_triangle(p, a, b, c, eps) || point_in_triangle(p, a, c, d, eps)
}

/// Signed triangle area; positive for counter-clockwise winding.
pub fn triangle_signed_area(a: Point2, b: Point2, c: Point2) -> f64 {
    0.5 * orient(a, b, c)
}

/// Signed polygon area by the shoelace formula; positive for counter-clockwise winding.
pub fn polygon_signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        twice += p[0] * q[1] - p[1] * q[0];
    }
    0.5 * twice
}

pub fn edge_length(a: Point2, b: Point2) -> f64 {
    (b[0] - a[0]).hypot(b[1] - a[1])
}

/// Vertex average. Returns the origin for an empty slice.
pub fn centroid(points: &[Point2]) -> Point2 {
    if points.is_empty() {
        return [0.0, 0.0];
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
    [sx / n, sy / n]
}

fn law_of_cosines(adj1: f64, adj2: f64, opposite: f64) -> f64 {
    let cos = (adj1 * adj1 + adj2 * adj2 - opposite * opposite) / (2.0 * adj1 * adj2 + COSINE_FLOOR);
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Interior angles in degrees at `a`, `b` and `c`.
///
/// The cosine is clamped to `[-1, 1]` so round-off never produces NaN for
/// well-formed input.
pub fn triangle_angles(a: Point2, b: Point2, c: Point2) -> [f64; 3] {
    let la = edge_length(b, c);
    let lb = edge_length(c, a);
    let lc = edge_length(a, b);
    [
        law_of_cosines(lb, lc, la),
        law_of_cosines(lc, la, lb),
        law_of_cosines(la, lb, lc),
    ]
}

/// Angle in degrees at each vertex between the edges to its two neighbours.
pub fn polygon_interior_angles(points: &[Point2]) -> Vec<f64> {
    let n = points.len();
    (0..n)
        .map(|i| {
            let here = points[i];
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            let u = [prev[0] - here[0], prev[1] - here[1]];
            let v = [next[0] - here[0], next[1] - here[1]];
            let norm = u[0].hypot(u[1]) * v[0].hypot(v[1]) + COSINE_FLOOR;
            let cos = (u[0] * v[0] + u[1] * v[1]) / norm;
            cos.clamp(-1.0, 1.0).acos().to_degrees()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT_SQUARE: [Point2; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn crossing_segments_intersect() {
        assert!(segments_intersect(
            [0.0, 0.0],
            [1.0, 1.0],
            [0.0, 1.0],
            [1.0, 0.0],
            DEFAULT_COLLINEAR_EPS
        ));
    }

    #[test]
    fn parallel_disjoint_segments_do_not_intersect() {
        assert!(!segments_intersect(
            [0.0, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [1.0, 1.0],
            DEFAULT_COLLINEAR_EPS
        ));
    }

    #[test]
    fn touching_endpoints_count_as_intersecting() {
        assert!(segments_intersect(
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 0.0],
            [2.0, 3.0],
            DEFAULT_COLLINEAR_EPS
        ));
    }

    #[test]
    fn collinear_overlap_intersects_and_collinear_gap_does_not() {
        assert!(segments_intersect(
            [0.0, 0.0],
            [2.0, 0.0],
            [1.0, 0.0],
            [3.0, 0.0],
            DEFAULT_COLLINEAR_EPS
        ));
        assert!(!segments_intersect(
            [0.0, 0.0],
            [1.0, 0.0],
            [2.0, 0.0],
            [3.0, 0.0],
            DEFAULT_COLLINEAR_EPS
        ));
    }

    #[test]
    fn point_in_triangle_includes_interior_and_boundary() {
        let (a, b, c) = ([0.0, 0.0], [1.0, 0.0], [0.0, 1.0]);
        assert!(point_in_triangle([0.25, 0.25], a, b, c, DEFAULT_CONTAINMENT_EPS));
        assert!(point_in_triangle([0.5, 0.0], a, b, c, DEFAULT_CONTAINMENT_EPS));
        assert!(!point_in_triangle([1.0, 1.0], a, b, c, DEFAULT_CONTAINMENT_EPS));
    }

    #[test]
    fn point_in_triangle_is_winding_agnostic() {
        let (a, b, c) = ([0.0, 0.0], [0.0, 1.0], [1.0, 0.0]);
        assert!(point_in_triangle([0.2, 0.2], a, b, c, DEFAULT_CONTAINMENT_EPS));
    }

    #[test]
    fn degenerate_triangle_contains_nothing() {
        let (a, b, c) = ([0.0, 0.0], [1.0, 1.0], [2.0, 2.0]);
        assert!(!point_in_triangle([1.0, 1.0], a, b, c, DEFAULT_CONTAINMENT_EPS));
    }

    #[test]
    fn point_in_quad_uses_both_halves() {
        assert!(point_in_quad([0.9, 0.1], UNIT_SQUARE, DEFAULT_CONTAINMENT_EPS));
        assert!(point_in_quad([0.1, 0.9], UNIT_SQUARE, DEFAULT_CONTAINMENT_EPS));
        assert!(!point_in_quad([1.5, 0.5], UNIT_SQUARE, DEFAULT_CONTAINMENT_EPS));
    }

    #[test]
    fn signed_area_sign_follows_winding() {
        assert!(close(polygon_signed_area(&UNIT_SQUARE), 1.0));
        let mut cw = UNIT_SQUARE;
        cw.reverse();
        assert!(close(polygon_signed_area(&cw), -1.0));
        assert!(close(
            triangle_signed_area([0.0, 0.0], [1.0, 0.0], [0.0, 1.0]),
            0.5
        ));
        assert!(close(
            triangle_signed_area([0.0, 0.0], [0.0, 1.0], [1.0, 0.0]),
            -0.5
        ));
    }

    #[test]
    fn polygon_area_of_fewer_than_three_points_is_zero() {
        assert_eq!(polygon_signed_area(&[[0.0, 0.0], [1.0, 1.0]]), 0.0);
    }

    #[test]
    fn right_isoceles_angles() {
        let angles = triangle_angles([0.0, 0.0], [1.0, 0.0], [0.0, 1.0]);
        assert!(close(angles[0], 90.0));
        assert!(close(angles[1], 45.0));
        assert!(close(angles[2], 45.0));
    }

    #[test]
    fn collapsed_triangle_angles_are_finite() {
        let angles = triangle_angles([0.0, 0.0], [0.0, 0.0], [1.0, 0.0]);
        assert!(angles.iter().all(|a| a.is_finite()));
    }

    #[test]
    fn square_interior_angles_are_right() {
        let angles = polygon_interior_angles(&UNIT_SQUARE);
        assert_eq!(angles.len(), 4);
        assert!(angles.iter().all(|a| close(*a, 90.0)));
    }

    #[test]
    fn centroid_is_vertex_average() {
        assert_eq!(centroid(&UNIT_SQUARE), [0.5, 0.5]);
        assert_eq!(centroid(&[]), [0.0, 0.0]);
    }

    #[test]
    fn edge_length_is_euclidean() {
        assert!(close(edge_length([0.0, 0.0], [3.0, 4.0]), 5.0));
    }
}
