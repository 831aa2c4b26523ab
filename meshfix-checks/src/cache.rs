use crate::grid::SpatialGrid;
use crate::view::MeshView;
use meshfix_geom::{Aabb2, Point2, centroid};
use meshfix_types::Edge;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Canonical `(min, max)` key for an undirected edge.
pub fn edge_key(u: usize, v: usize) -> Edge {
    if u < v { (u, v) } else { (v, u) }
}

/// Derived adjacency and geometry, built once per validation pass and shared
/// read-only by every rule.
#[derive(Debug, Clone, Default)]
pub struct MeshCache {
    /// Per unified cell, its edges in vertex-cycle order.
    pub cell_edges: Vec<Vec<Edge>>,

    /// Edge to every cell listing it. A cell that lists an edge twice appears
    /// twice, so the list length is the edge degree.
    pub edge_cells: BTreeMap<Edge, Vec<usize>>,

    /// Only referenced nodes have entries.
    pub node_cells: BTreeMap<usize, Vec<usize>>,

    pub node_edges: BTreeMap<usize, Vec<Edge>>,

    pub tri_centroids: Vec<Point2>,
    pub quad_centroids: Vec<Point2>,

    pub cell_boxes: Vec<Aabb2>,

    /// Built only when a pass asks for it (see [`MeshCache::build`]).
    pub grid: Option<SpatialGrid>,

    /// `None` when the mesh carries no line connectivity. Never an empty
    /// stand-in for "unknown".
    pub boundary_edges: Option<BTreeSet<Edge>>,
}

impl MeshCache {
    /// `grid_bins` of `None` skips the spatial grid.
    pub fn build(view: &MeshView<'_>, grid_bins: Option<usize>) -> Self {
        let mut cache = Self::default();

        for (_, nodes) in view.cells() {
            let k = nodes.len();
            let edges = (0..k)
                .map(|i| edge_key(nodes[i], nodes[(i + 1) % k]))
                .collect();
            cache.cell_edges.push(edges);
        }

        for (cid, edges) in cache.cell_edges.iter().enumerate() {
            for &e in edges {
                cache.edge_cells.entry(e).or_default().push(cid);
            }
        }

        for (cid, nodes) in view.cells() {
            for &n in nodes {
                cache.node_cells.entry(n).or_default().push(cid);
            }
        }

        for &(u, v) in cache.edge_cells.keys() {
            cache.node_edges.entry(u).or_default().push((u, v));
            cache.node_edges.entry(v).or_default().push((u, v));
        }

        cache.tri_centroids = view
            .triangles()
            .iter()
            .map(|t| centroid(&view.nodes_to_points(t)))
            .collect();
        cache.quad_centroids = view
            .quads()
            .iter()
            .map(|q| centroid(&view.nodes_to_points(q)))
            .collect();

        cache.cell_boxes = (0..view.n_cells())
            .map(|cid| Aabb2::from_points(view.cell_points(cid)).unwrap_or_default())
            .collect();
        cache.grid = grid_bins.map(|bins| SpatialGrid::build(&cache.cell_boxes, bins));

        cache.boundary_edges = view.mesh().boundary_edges();

        debug!(
            cells = cache.cell_edges.len(),
            edges = cache.edge_cells.len(),
            nodes = cache.node_cells.len(),
            boundary_known = cache.boundary_edges.is_some(),
            grid = cache.grid.is_some(),
            "mesh cache built"
        );
        cache
    }

    pub fn edge_degree(&self, e: &Edge) -> usize {
        self.edge_cells.get(e).map_or(0, Vec::len)
    }

    /// Two cells have at least one edge in common.
    pub fn share_edge(&self, i: usize, j: usize) -> bool {
        let (Some(ei), Some(ej)) = (self.cell_edges.get(i), self.cell_edges.get(j)) else {
            return false;
        };
        ei.iter().any(|e| ej.contains(e))
    }
}
