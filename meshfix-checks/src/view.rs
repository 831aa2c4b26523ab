use meshfix_geom::{Aabb2, Point2};
use meshfix_mesh::{CellTagIndices, MeshData};
use meshfix_types::CellKind;
use std::collections::BTreeMap;

/// Read-only snapshot of a mesh for one validation pass.
///
/// Cells use unified ids: triangles `0..T`, then quads `T..T+Q`.
#[derive(Debug, Clone, Copy)]
pub struct MeshView<'a> {
    mesh_path: &'a str,
    mesh: &'a MeshData,
}

impl<'a> MeshView<'a> {
    pub fn new(mesh_path: &'a str, mesh: &'a MeshData) -> Self {
        Self { mesh_path, mesh }
    }

    pub fn mesh_path(&self) -> &'a str {
        self.mesh_path
    }

    pub fn mesh(&self) -> &'a MeshData {
        self.mesh
    }

    pub fn points(&self) -> &'a [Point2] {
        &self.mesh.points
    }

    pub fn triangles(&self) -> &'a [[usize; 3]] {
        &self.mesh.triangles
    }

    pub fn quads(&self) -> &'a [[usize; 4]] {
        &self.mesh.quads
    }

    pub fn cell_tags(&self) -> &'a BTreeMap<String, CellTagIndices> {
        &self.mesh.cell_tags
    }

    pub fn line_tags(&self) -> &'a BTreeMap<String, Vec<usize>> {
        &self.mesh.line_tags
    }

    pub fn bbox(&self) -> Aabb2 {
        self.mesh.bbox
    }

    pub fn n_points(&self) -> usize {
        self.mesh.points.len()
    }

    pub fn n_tris(&self) -> usize {
        self.mesh.triangles.len()
    }

    pub fn n_quads(&self) -> usize {
        self.mesh.quads.len()
    }

    pub fn n_cells(&self) -> usize {
        self.n_tris() + self.n_quads()
    }

    /// Node list of a unified cell.
    pub fn cell_nodes(&self, cid: usize) -> &'a [usize] {
        let n_tris = self.n_tris();
        if cid < n_tris {
            &self.mesh.triangles[cid]
        } else {
            &self.mesh.quads[cid - n_tris]
        }
    }

    /// Block and local index of a unified cell.
    pub fn cell_kind(&self, cid: usize) -> (CellKind, usize) {
        let n_tris = self.n_tris();
        if cid < n_tris {
            (CellKind::Tri, cid)
        } else {
            (CellKind::Quad, cid - n_tris)
        }
    }

    pub fn cell_points(&self, cid: usize) -> Vec<Point2> {
        self.nodes_to_points(self.cell_nodes(cid))
    }

    pub fn nodes_to_points(&self, nodes: &[usize]) -> Vec<Point2> {
        nodes.iter().map(|&n| self.mesh.points[n]).collect()
    }

    /// Unified cells in id order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, &'a [usize])> + 'a {
        let tris = self.mesh.triangles.iter().map(|t| t.as_slice());
        let quads = self.mesh.quads.iter().map(|q| q.as_slice());
        tris.chain(quads).enumerate()
    }
}
