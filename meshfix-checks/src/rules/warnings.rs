//! Warn-tier rules: quality advisories that never fail the pass.

use super::{SAMPLE, signed_cell_area, split_cell_area};
use crate::cache::MeshCache;
use crate::config::Thresholds;
use crate::stats::{mean, percentile};
use crate::view::MeshView;
use meshfix_geom::{polygon_interior_angles, triangle_angles};
use meshfix_types::{CellKind, Edge, Example, Finding, Severity};
use std::collections::{BTreeMap, BTreeSet};

fn finding(id: &str, fixable: bool) -> Finding {
    Finding::new(id, Severity::Warn, fixable)
}

/// Dangling edges (degree <= 1) that meet tip to tip.
pub fn two_single_edges(_view: &MeshView<'_>, _th: &Thresholds, cache: &MeshCache) -> Finding {
    let mut at_node: BTreeMap<usize, Vec<Edge>> = BTreeMap::new();
    for (&e, cells) in &cache.edge_cells {
        if cells.len() <= 1 && e.0 != e.1 {
            at_node.entry(e.0).or_default().push(e);
            at_node.entry(e.1).or_default().push(e);
        }
    }

    // A pair must span exactly three nodes.
    let mut pairs: BTreeSet<(Edge, Edge)> = BTreeSet::new();
    for edges in at_node.values() {
        for (k, &a) in edges.iter().enumerate() {
            for &b in &edges[k + 1..] {
                let nodes = BTreeSet::from([a.0, a.1, b.0, b.1]);
                if a != b && nodes.len() == 3 {
                    pairs.insert((a.min(b), a.max(b)));
                }
            }
        }
    }

    let examples = pairs
        .iter()
        .take(10)
        .map(|&(a, b)| Example::EdgePair(a, b))
        .collect();
    finding("two_single_edges", true)
        .with_violations(pairs.len(), examples)
        .with_note("Dangling edges may indicate tiny holes or geometry defects.")
}

/// Cells far smaller than the mean, or below an absolute floor.
pub fn tiny_elements(view: &MeshView<'_>, th: &Thresholds, _cache: &MeshCache) -> Finding {
    let areas: Vec<f64> = (0..view.n_cells())
        .map(|cid| split_cell_area(view, cid))
        .collect();
    let Some(mean_area) = mean(&areas) else {
        return finding("tiny_elements", true);
    };

    let rel = th.tiny_area_rel * mean_area;
    let bad: Vec<usize> = areas
        .iter()
        .enumerate()
        .filter(|&(_, &a)| a < rel || a < th.tiny_area_abs)
        .map(|(cid, _)| cid)
        .collect();

    let examples = bad.iter().take(SAMPLE).map(|&cid| Example::Index(cid)).collect();
    finding("tiny_elements", true)
        .with_violations(bad.len(), examples)
        .with_detail("mean_area", mean_area)
        .with_detail("rel_thr", th.tiny_area_rel)
        .with_detail("abs_thr", th.tiny_area_abs)
}

/// Triangles whose smallest interior angle is below `min_angle_deg`.
pub fn min_angle_tris(view: &MeshView<'_>, th: &Thresholds, _cache: &MeshCache) -> Finding {
    if view.n_tris() == 0 {
        return finding("min_angle_tris", true);
    }

    let pts = view.points();
    let min_angles: Vec<f64> = view
        .triangles()
        .iter()
        .map(|t| {
            triangle_angles(pts[t[0]], pts[t[1]], pts[t[2]])
                .into_iter()
                .fold(f64::INFINITY, f64::min)
        })
        .collect();

    let bad: Vec<usize> = min_angles
        .iter()
        .enumerate()
        .filter(|&(_, &a)| a < th.min_angle_deg)
        .map(|(i, _)| i)
        .collect();

    let examples = bad.iter().take(SAMPLE).map(|&i| Example::Index(i)).collect();
    finding("min_angle_tris", true)
        .with_violations(bad.len(), examples)
        .with_detail("thr_deg", th.min_angle_deg)
        .with_detail("p5", percentile(&min_angles, 5.0))
}

/// Quads whose worst corner deviates from 90 degrees by more than
/// `quad_skew_p95 * 90`.
pub fn quad_skewness_orthogonality(view: &MeshView<'_>, th: &Thresholds, _cache: &MeshCache) -> Finding {
    if view.n_quads() == 0 {
        return finding("quad_skewness_orthogonality", true);
    }

    let pts = view.points();
    let skews: Vec<f64> = view
        .quads()
        .iter()
        .map(|q| {
            polygon_interior_angles(&q.map(|n| pts[n]))
                .into_iter()
                .map(|a| (a - 90.0).abs())
                .fold(0.0, f64::max)
        })
        .collect();

    let limit = th.quad_skew_p95 * 90.0;
    let bad: Vec<usize> = skews
        .iter()
        .enumerate()
        .filter(|&(_, &s)| s > limit)
        .map(|(i, _)| i)
        .collect();

    let examples = bad
        .iter()
        .take(SAMPLE)
        .map(|&i| Example::cell(CellKind::Quad, i))
        .collect();
    finding("quad_skewness_orthogonality", true)
        .with_violations(bad.len(), examples)
        .with_detail("skew_thr", th.quad_skew_p95)
        .with_detail("p95_skew", percentile(&skews, 95.0))
}

/// Interior edges across which the cell size (square root of area) jumps by
/// more than `grading_ratio_max`.
pub fn grading_spikes(view: &MeshView<'_>, th: &Thresholds, cache: &MeshCache) -> Finding {
    let sizes: Vec<f64> = (0..view.n_cells())
        .map(|cid| signed_cell_area(view, cid).abs().sqrt())
        .collect();

    let mut spikes: Vec<(Edge, f64)> = Vec::new();
    for (&e, cells) in &cache.edge_cells {
        let [c0, c1] = cells.as_slice() else {
            continue;
        };
        let (s0, s1) = (sizes[*c0], sizes[*c1]);
        // A zero-size neighbour is a degeneracy, reported elsewhere.
        if s0 <= 0.0 || s1 <= 0.0 {
            continue;
        }
        let ratio = (s0 / s1).max(s1 / s0);
        if ratio > th.grading_ratio_max {
            spikes.push((e, ratio));
        }
    }

    let pct = 100.0 * spikes.len() as f64 / cache.edge_cells.len().max(1) as f64;
    let examples = spikes
        .iter()
        .take(SAMPLE)
        .map(|&(e, r)| Example::EdgeRatio(e, r))
        .collect();
    finding("grading_spikes", true)
        .with_violations(spikes.len(), examples)
        .with_detail("thr", th.grading_ratio_max)
        .with_detail("pct_edges_over", pct)
}

/// Advisory first-layer height proxy: quad centroid distance from the origin
/// relative to `first_layer_target`.
pub fn first_layer_height(_view: &MeshView<'_>, th: &Thresholds, cache: &MeshCache) -> Finding {
    let f = finding("first_layer_height", false);
    let Some(target) = th.first_layer_target else {
        return f.skipped("no target");
    };
    if !(target > 0.0) {
        return f.skipped("target must be positive");
    }
    if cache.quad_centroids.is_empty() {
        return f.skipped("no quads");
    }

    let ratios: Vec<f64> = cache
        .quad_centroids
        .iter()
        .map(|c| c[0].hypot(c[1]) / target)
        .collect();

    let mut f = f
        .with_detail("target", target)
        .with_detail("p50", percentile(&ratios, 50.0))
        .with_detail("p90", percentile(&ratios, 90.0));
    // Informational: the count is the sample size, not a violation tally.
    f.count = ratios.len();
    f
}

/// The wall line tag exists and covers at least one line.
pub fn boundary_coverage(view: &MeshView<'_>, th: &Thresholds, _cache: &MeshCache) -> Finding {
    let f = finding("boundary_coverage", false);
    let Some(lines) = view.line_tags().get(&th.wall_name) else {
        return f.skipped("no wall tag");
    };

    if lines.is_empty() {
        finding("boundary_coverage", true)
            .with_violations(1, Vec::new())
            .with_note("missing wall segments")
    } else {
        finding("boundary_coverage", true).with_note("line coverage present")
    }
}

/// Cells that belong to no cell tag.
pub fn untagged_entities(view: &MeshView<'_>, _th: &Thresholds, _cache: &MeshCache) -> Finding {
    let tagged = view.mesh().tagged_cell_ids();
    let missing: Vec<usize> = (0..view.n_cells()).filter(|cid| !tagged.contains(cid)).collect();

    let examples = missing.iter().take(SAMPLE).map(|&cid| Example::Index(cid)).collect();
    finding("untagged_entities", true)
        .with_violations(missing.len(), examples)
        .with_note("cells without tags")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CheckFn;
    use meshfix_geom::Point2;
    use meshfix_mesh::{CellTagIndices, MeshData};
    use pretty_assertions::assert_eq;

    fn run(rule: CheckFn, mesh: &MeshData, th: &Thresholds) -> Finding {
        let view = MeshView::new("test.json", mesh);
        let cache = MeshCache::build(&view, Some(th.overlap_grid_bins));
        rule(&view, th, &cache)
    }

    fn unit_square() -> Vec<Point2> {
        vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
    }

    #[test]
    fn lone_triangle_has_three_dangling_pairs() {
        let mesh = MeshData::from_parts(unit_square(), vec![[0, 1, 2]], vec![]);
        let f = run(two_single_edges, &mesh, &Thresholds::default());
        assert_eq!(f.count, 3);
        assert_eq!(
            f.examples[0],
            Example::EdgePair((0, 1), (0, 2))
        );
    }

    #[test]
    fn collapsed_edge_never_pairs_with_itself() {
        let mesh = MeshData::from_parts(unit_square(), vec![[0, 0, 1]], vec![]);
        let f = run(two_single_edges, &mesh, &Thresholds::default());
        assert_eq!(f.count, 0);
        assert!(f.examples.is_empty());
    }

    #[test]
    fn split_square_pairs_every_boundary_corner() {
        // The diagonal is interior; the four sides dangle.
        let mesh = MeshData::from_parts(unit_square(), vec![[0, 1, 2], [0, 2, 3]], vec![]);
        let f = run(two_single_edges, &mesh, &Thresholds::default());
        assert_eq!(f.count, 4);
    }

    #[test]
    fn tiny_elements_use_unified_ids() {
        let mut pts = unit_square();
        pts.extend([[2.0, 0.0], [2.0, 1.0], [1.0, 1e-5]]);
        let th = Thresholds {
            tiny_area_rel: 1e-2,
            ..Thresholds::default()
        };
        let mesh = MeshData::from_parts(pts, vec![[0, 1, 2], [0, 2, 3], [1, 4, 6]], vec![[1, 4, 5, 2]]);
        let f = run(tiny_elements, &mesh, &th);
        assert_eq!(f.count, 1);
        assert_eq!(f.examples, vec![Example::Index(2)]);
        assert!(f.details.contains_key("mean_area"));
    }

    #[test]
    fn tiny_elements_absolute_floor() {
        let th = Thresholds {
            tiny_area_abs: 1.0,
            ..Thresholds::default()
        };
        let mesh = MeshData::from_parts(unit_square(), vec![[0, 1, 2]], vec![]);
        let f = run(tiny_elements, &mesh, &th);
        assert_eq!(f.count, 1);
    }

    #[test]
    fn narrow_triangle_fails_min_angle() {
        let th = Thresholds {
            min_angle_deg: 30.0,
            ..Thresholds::default()
        };
        // Angles of roughly 10, 80 and 90 degrees.
        let tan10 = 10f64.to_radians().tan();
        let mesh = MeshData::from_parts(
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, tan10], [0.0, 1.0], [1.0, 1.0]],
            vec![[0, 1, 2], [3, 1, 4]],
            vec![],
        );
        let f = run(min_angle_tris, &mesh, &th);
        assert_eq!(f.count, 1);
        assert_eq!(f.examples, vec![Example::Index(0)]);
        assert_eq!(f.details["thr_deg"], 30.0);
        let p5 = f.details["p5"].as_f64().expect("p5");
        assert!(p5 > 9.0 && p5 < 45.0, "p5 = {p5}");
    }

    #[test]
    fn min_angle_without_triangles_passes_without_details() {
        let mesh = MeshData::from_parts(unit_square(), vec![], vec![[0, 1, 2, 3]]);
        let f = run(min_angle_tris, &mesh, &Thresholds::default());
        assert!(f.ok);
        assert!(f.details.is_empty());
    }

    #[test]
    fn sheared_quad_is_skewed() {
        let mesh = MeshData::from_parts(
            vec![[0.0, 0.0], [1.0, 0.0], [9.0, 1.0], [8.0, 1.0], [0.0, 2.0], [1.0, 2.0], [1.0, 3.0], [0.0, 3.0]],
            vec![],
            vec![[0, 1, 2, 3], [4, 5, 6, 7]],
        );
        let f = run(quad_skewness_orthogonality, &mesh, &Thresholds::default());
        assert_eq!(f.count, 1);
        assert_eq!(f.examples, vec![Example::cell(CellKind::Quad, 0)]);
    }

    #[test]
    fn grading_spike_across_shared_edge() {
        // Unit triangle next to a large one sharing edge (1, 2).
        let mesh = MeshData::from_parts(
            vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [20.0, 20.0]],
            vec![[0, 1, 2], [1, 3, 2]],
            vec![],
        );
        let f = run(grading_spikes, &mesh, &Thresholds::default());
        assert_eq!(f.count, 1);
        match &f.examples[0] {
            Example::EdgeRatio(e, r) => {
                assert_eq!(*e, (1, 2));
                assert!(*r > 2.5);
            }
            other => panic!("unexpected example {other:?}"),
        }
        assert_eq!(f.details["thr"], 2.5);
    }

    #[test]
    fn grading_ignores_zero_size_neighbours() {
        let mesh = MeshData::from_parts(
            vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [2.0, -1.0]],
            vec![[0, 1, 2], [1, 3, 2]],
            vec![],
        );
        let f = run(grading_spikes, &mesh, &Thresholds::default());
        assert!(f.ok);
    }

    #[test]
    fn first_layer_height_needs_target_and_quads() {
        let mesh = MeshData::from_parts(unit_square(), vec![], vec![[0, 1, 2, 3]]);
        let f = run(first_layer_height, &mesh, &Thresholds::default());
        assert_eq!(f.details["skipped"], "no target");

        let th = Thresholds {
            first_layer_target: Some(0.5),
            ..Thresholds::default()
        };
        let f = run(first_layer_height, &mesh, &th);
        assert!(f.ok);
        assert_eq!(f.count, 1);
        let p50 = f.details["p50"].as_f64().expect("p50");
        assert!((p50 - 0.5f64.hypot(0.5) / 0.5).abs() < 1e-12);
        assert!(!f.fixable);
    }

    #[test]
    fn boundary_coverage_tracks_wall_tag() {
        let mut mesh = MeshData::from_parts(unit_square(), vec![[0, 1, 2]], vec![]);
        assert!(run(boundary_coverage, &mesh, &Thresholds::default()).is_skipped());

        mesh.line_tags.insert("airfoil".to_string(), vec![]);
        let f = run(boundary_coverage, &mesh, &Thresholds::default());
        assert!(!f.ok);
        assert_eq!(f.count, 1);

        mesh.line_tags.insert("airfoil".to_string(), vec![0, 1]);
        assert!(run(boundary_coverage, &mesh, &Thresholds::default()).ok);
    }

    #[test]
    fn untagged_cells_in_unified_numbering() {
        let mut pts = unit_square();
        pts.extend([[2.0, 0.0], [2.0, 1.0]]);
        let mut mesh = MeshData::from_parts(pts, vec![[0, 1, 2], [0, 2, 3]], vec![[1, 4, 5, 2]]);
        mesh.cell_tags.insert(
            "fluid".to_string(),
            CellTagIndices {
                triangle: vec![0],
                quad: vec![0],
            },
        );
        let f = run(untagged_entities, &mesh, &Thresholds::default());
        assert_eq!(f.count, 1);
        assert_eq!(f.examples, vec![Example::Index(1)]);
    }
}
