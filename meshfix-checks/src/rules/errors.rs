//! Error-tier rules: any violation fails the pass.

use super::{SAMPLE, signed_cell_area};
use crate::cache::MeshCache;
use crate::config::Thresholds;
use crate::grid::SpatialGrid;
use crate::view::MeshView;
use meshfix_geom::{
    DEFAULT_CONTAINMENT_EPS, Point2, centroid, point_in_quad, point_in_triangle,
    segments_intersect,
};
use meshfix_types::{CellKind, Example, Finding, Severity};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

fn finding(id: &str, fixable: bool) -> Finding {
    Finding::new(id, Severity::Error, fixable)
}

fn cell_examples(cells: &[(CellKind, usize)]) -> Vec<Example> {
    cells
        .iter()
        .take(SAMPLE)
        .map(|&(kind, idx)| Example::cell(kind, idx))
        .collect()
}

/// Cells whose sorted node tuples repeat; every occurrence after the first
/// is reported.
pub fn duplicate_elements(view: &MeshView<'_>, _th: &Thresholds, _cache: &MeshCache) -> Finding {
    let mut dups = Vec::new();

    let mut seen: BTreeSet<Vec<usize>> = BTreeSet::new();
    for (i, tri) in view.triangles().iter().enumerate() {
        let mut key = tri.to_vec();
        key.sort_unstable();
        if !seen.insert(key) {
            dups.push((CellKind::Tri, i));
        }
    }

    seen.clear();
    for (i, quad) in view.quads().iter().enumerate() {
        let mut key = quad.to_vec();
        key.sort_unstable();
        if !seen.insert(key) {
            dups.push((CellKind::Quad, i));
        }
    }

    finding("duplicate_elements", true)
        .with_violations(dups.len(), cell_examples(&dups))
        .with_note("Duplicate elements share identical node sets.")
}

/// Cells wound clockwise in the XY plane.
pub fn surface_orientation(view: &MeshView<'_>, _th: &Thresholds, _cache: &MeshCache) -> Finding {
    let bad: Vec<(CellKind, usize)> = (0..view.n_cells())
        .filter(|&cid| signed_cell_area(view, cid) < 0.0)
        .map(|cid| view.cell_kind(cid))
        .collect();

    finding("surface_orientation", true)
        .with_violations(bad.len(), cell_examples(&bad))
        .with_note("Negative signed area implies CW orientation in XY plane.")
}

/// Degenerate cells, and quads whose opposite edges cross. Winding is not
/// penalized here.
pub fn negative_jacobians(view: &MeshView<'_>, th: &Thresholds, _cache: &MeshCache) -> Finding {
    let eps = th.collinear_eps;
    let pts = view.points();
    let mut bad = Vec::new();

    for (i, tri) in view.triangles().iter().enumerate() {
        let area = meshfix_geom::triangle_signed_area(pts[tri[0]], pts[tri[1]], pts[tri[2]]);
        if area.abs() <= eps {
            bad.push((CellKind::Tri, i));
        }
    }

    let mut bad_quads = BTreeSet::new();
    for (i, quad) in view.quads().iter().enumerate() {
        let [p0, p1, p2, p3] = quad.map(|n| pts[n]);
        let degenerate = meshfix_geom::polygon_signed_area(&[p0, p1, p2, p3]).abs() <= eps;
        let bow_tie =
            segments_intersect(p0, p1, p2, p3, eps) || segments_intersect(p1, p2, p3, p0, eps);
        if degenerate || bow_tie {
            bad_quads.insert(i);
        }
    }
    bad.extend(bad_quads.into_iter().map(|i| (CellKind::Quad, i)));

    finding("negative_jacobians", true)
        .with_violations(bad.len(), cell_examples(&bad))
        .with_note("Flags only degenerate or self-intersecting elements; orientation is allowed.")
}

fn contains(nodes_pts: &[Point2], p: Point2) -> bool {
    match nodes_pts {
        [a, b, c] => point_in_triangle(p, *a, *b, *c, DEFAULT_CONTAINMENT_EPS),
        [a, b, c, d] => point_in_quad(p, [*a, *b, *c, *d], DEFAULT_CONTAINMENT_EPS),
        _ => false,
    }
}

fn edges_cross(a: &[Point2], b: &[Point2], eps: f64) -> bool {
    let ring = |pts: &[Point2]| -> Vec<(Point2, Point2)> {
        (0..pts.len())
            .map(|k| (pts[k], pts[(k + 1) % pts.len()]))
            .collect()
    };
    let rb = ring(b);
    ring(a)
        .into_iter()
        .any(|(a0, a1)| rb.iter().any(|&(b0, b1)| segments_intersect(a0, a1, b0, b1, eps)))
}

/// Non-adjacent cell pairs whose outlines touch or cross, or where one
/// contains the other's centroid.
pub fn overlapping_elements(view: &MeshView<'_>, th: &Thresholds, cache: &MeshCache) -> Finding {
    let local;
    let grid = match &cache.grid {
        Some(grid) => grid,
        None => {
            local = SpatialGrid::build(&cache.cell_boxes, th.overlap_grid_bins);
            &local
        }
    };

    let mut overlaps = Vec::new();
    for i in 0..view.n_cells() {
        let pi = view.cell_points(i);
        for j in grid.neighbors(i) {
            if cache.share_edge(i, j) {
                continue;
            }
            let pj = view.cell_points(j);
            let hit = edges_cross(&pi, &pj, th.collinear_eps)
                || contains(&pj, centroid(&pi))
                || contains(&pi, centroid(&pj));
            if hit {
                overlaps.push((i, j));
            }
        }
    }

    let examples = overlaps
        .iter()
        .take(SAMPLE)
        .map(|&(i, j)| Example::Pair(i, j))
        .collect();
    finding("overlapping_elements", true)
        .with_violations(overlaps.len(), examples)
        .with_note("Excludes shared edges; counts real overlaps or containment only.")
}

const NO_BOUNDARY: &str = "boundary edges not provided";

/// Degree-1 edges that are not on the declared boundary.
pub fn uncovered_faces(_view: &MeshView<'_>, _th: &Thresholds, cache: &MeshCache) -> Finding {
    let f = finding("uncovered_faces", true);
    let Some(boundary) = &cache.boundary_edges else {
        return f.skipped(NO_BOUNDARY);
    };

    let uncovered: Vec<_> = cache
        .edge_cells
        .iter()
        .filter(|(e, cells)| cells.len() == 1 && !boundary.contains(*e))
        .map(|(e, _)| *e)
        .collect();

    let examples = uncovered.iter().take(SAMPLE).map(|&e| Example::edge(e)).collect();
    f.with_violations(uncovered.len(), examples)
        .with_note("degree-1 non-boundary edges should not exist")
}

/// Interior edges not shared by exactly two cells.
pub fn missing_internal_faces(_view: &MeshView<'_>, _th: &Thresholds, cache: &MeshCache) -> Finding {
    let f = finding("missing_internal_faces", true);
    let Some(boundary) = &cache.boundary_edges else {
        return f.skipped(NO_BOUNDARY);
    };

    let bad: Vec<_> = cache
        .edge_cells
        .iter()
        .filter(|(e, cells)| !boundary.contains(*e) && cells.len() != 2)
        .collect();

    let examples = bad
        .iter()
        .take(SAMPLE)
        .map(|(e, cells)| Example::EdgeCells(**e, cells.to_vec()))
        .collect();
    f.with_violations(bad.len(), examples)
        .with_note("internal edges must be shared by exactly two cells")
}

/// Edges that a single cell lists more than once, e.g. a quad that folds
/// back over itself.
pub fn multiple_edges(_view: &MeshView<'_>, _th: &Thresholds, cache: &MeshCache) -> Finding {
    let mut dups = BTreeSet::new();
    for edges in &cache.cell_edges {
        let mut counts: BTreeMap<_, usize> = BTreeMap::new();
        for &e in edges {
            *counts.entry(e).or_default() += 1;
        }
        dups.extend(counts.into_iter().filter(|(_, n)| *n > 1).map(|(e, _)| e));
    }

    let examples = dups.iter().take(SAMPLE).map(|&e| Example::edge(e)).collect();
    finding("multiple_edges", true)
        .with_violations(dups.len(), examples)
        .with_note("More than one topological edge between the same two nodes.")
}

/// Edges shared by more than two cells, and nodes with outlying incidence.
pub fn nonmanifold(_view: &MeshView<'_>, _th: &Thresholds, cache: &MeshCache) -> Finding {
    let edges_gt2: Vec<_> = cache
        .edge_cells
        .iter()
        .filter(|(_, cells)| cells.len() > 2)
        .map(|(e, _)| *e)
        .collect();

    let incidences: Vec<f64> = cache.node_cells.values().map(|c| c.len() as f64).collect();
    let high_nodes: Vec<usize> = match (crate::stats::mean(&incidences), crate::stats::std_dev(&incidences)) {
        (Some(mu), Some(sd)) => {
            let thr = mu + 5.0 * (sd + 1e-9);
            cache
                .node_cells
                .iter()
                .filter(|(_, cells)| cells.len() as f64 > thr && cells.len() >= 8)
                .map(|(n, _)| *n)
                .collect()
        }
        _ => Vec::new(),
    };

    let examples = edges_gt2
        .iter()
        .take(10)
        .map(|&e| Example::tagged_edge(e))
        .chain(high_nodes.iter().take(10).map(|&n| Example::node(n)))
        .collect();

    finding("nonmanifold", true)
        .with_violations(edges_gt2.len() + high_nodes.len(), examples)
        .with_detail("edges_incident_gt2", edges_gt2.len())
        .with_detail("high_incidence_nodes", high_nodes.len())
}

/// Boundary-layer continuity along the wall. Presence check only for now.
pub fn bl_continuity(view: &MeshView<'_>, th: &Thresholds, cache: &MeshCache) -> Finding {
    let skip = finding("bl_continuity", false);
    if view.n_quads() == 0 {
        return skip.skipped("No quads present.");
    }
    let has_wall = view
        .line_tags()
        .get(&th.wall_name)
        .is_some_and(|lines| !lines.is_empty());
    if !has_wall {
        return skip.skipped(format!("Line tag '{}' not found.", th.wall_name));
    }
    if cache.quad_centroids.is_empty() {
        return skip.skipped("No quad centroids.");
    }

    finding("bl_continuity", true)
        .with_note("Presence check only; strict continuity needs a wall-distance field.")
}

/// Required physical group names, and their dimensions, against the mesh's
/// group catalog.
pub fn missing_physical_groups(view: &MeshView<'_>, th: &Thresholds, _cache: &MeshCache) -> Finding {
    let f = finding("missing_physical_groups", false);

    let catalog = match &view.mesh().physical_groups {
        Some(groups) if !groups.is_empty() => groups,
        _ if th.strict_if_no_field_data => {
            return f.with_violations(1, Vec::new()).with_detail(
                "message",
                "No physical group catalog in mesh; re-export with physical groups defined.",
            );
        }
        _ => return f.skipped("no physical group catalog"),
    };

    let missing: Vec<&String> = th
        .required_groups
        .iter()
        .filter(|name| !catalog.contains_key(*name))
        .collect();
    if !missing.is_empty() {
        let available: Vec<&str> = catalog.keys().map(String::as_str).collect();
        let examples = missing
            .iter()
            .take(10)
            .map(|name| Example::Name((*name).clone()))
            .collect();
        return f
            .with_violations(missing.len(), examples)
            .with_detail("missing", json!(missing))
            .with_detail("available", json!(available));
    }

    let expected: BTreeMap<String, u8> = match &th.group_dims {
        Some(dims) => dims.clone(),
        None => th
            .required_groups
            .iter()
            .map(|name| (name.clone(), if name == "fluid" { 2 } else { 1 }))
            .collect(),
    };
    let mismatches: Vec<(&String, u8, u8)> = expected
        .iter()
        .filter_map(|(name, &want)| {
            let got = *catalog.get(name)?;
            (got != want).then_some((name, want, got))
        })
        .collect();
    if !mismatches.is_empty() {
        let examples = mismatches
            .iter()
            .take(10)
            .map(|(name, _, _)| Example::Name((*name).clone()))
            .collect();
        let detail: Vec<_> = mismatches
            .iter()
            .map(|(name, want, got)| json!({"name": name, "expected": want, "got": got}))
            .collect();
        return f
            .with_violations(mismatches.len(), examples)
            .with_detail("dim_mismatches", detail);
    }

    f.with_detail("checked", json!(th.required_groups))
}
