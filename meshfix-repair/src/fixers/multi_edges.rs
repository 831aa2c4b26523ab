use crate::edit::{cell_signed_area, remove_cells};
use crate::error::RepairResult;
use crate::fixers::{FixResult, Fixer};
use meshfix_mesh::MeshData;
use meshfix_types::{CellKind, Edge, Finding, RulePolicy};
use std::collections::{BTreeMap, BTreeSet};

/// Trims edges shared by more than two cells down to the two largest.
pub struct MultipleEdgesFixer;

type CellRef = (CellKind, usize);

impl MultipleEdgesFixer {
    /// Edge to incident cells, each cell listed once per edge.
    fn edge_cells(mesh: &MeshData) -> BTreeMap<Edge, Vec<CellRef>> {
        let cells = mesh
            .triangles
            .iter()
            .enumerate()
            .map(|(i, t)| ((CellKind::Tri, i), &t[..]))
            .chain(
                mesh.quads
                    .iter()
                    .enumerate()
                    .map(|(i, q)| ((CellKind::Quad, i), &q[..])),
            );

        let mut out: BTreeMap<Edge, Vec<CellRef>> = BTreeMap::new();
        for (cell, nodes) in cells {
            let edges: BTreeSet<Edge> = (0..nodes.len())
                .map(|k| {
                    let (u, v) = (nodes[k], nodes[(k + 1) % nodes.len()]);
                    (u.min(v), u.max(v))
                })
                .collect();
            for e in edges {
                out.entry(e).or_default().push(cell);
            }
        }
        out
    }

    fn area(mesh: &MeshData, (kind, index): CellRef) -> f64 {
        cell_signed_area(mesh, kind, index).map_or(0.0, f64::abs)
    }
}

impl Fixer for MultipleEdgesFixer {
    fn rule_id(&self) -> &'static str {
        "multiple_edges"
    }

    fn fix(&self, mesh: &mut MeshData, _finding: &Finding, _policy: &RulePolicy) -> RepairResult<FixResult> {
        let mut extras: BTreeSet<CellRef> = BTreeSet::new();
        for mut incident in Self::edge_cells(mesh).into_values() {
            if incident.len() <= 2 {
                continue;
            }
            // Stable: equal areas keep tri-before-quad, then index order.
            incident.sort_by(|a, b| Self::area(mesh, *a).total_cmp(&Self::area(mesh, *b)));
            let keep_from = incident.len() - 2;
            extras.extend(incident.drain(..keep_from));
        }

        let pick = |kind: CellKind| -> Vec<usize> {
            extras
                .iter()
                .filter(|(k, _)| *k == kind)
                .map(|&(_, i)| i)
                .collect()
        };
        let tris = pick(CellKind::Tri);
        let quads = pick(CellKind::Quad);

        let removed = remove_cells(mesh, CellKind::Tri, &tris)? + remove_cells(mesh, CellKind::Quad, &quads)?;
        let notes = if removed > 0 {
            format!("Edges with >2 incidence fixed; removed {removed} cells.")
        } else {
            "No oversubscribed edges.".to_string()
        };
        Ok(FixResult::applied(removed, notes))
    }
}
