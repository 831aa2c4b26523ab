use crate::document::{CellTagIndices, MeshDocument};
use crate::load::MeshLoadError;
use meshfix_geom::{Aabb2, Point2};
use meshfix_types::schema;
use std::collections::{BTreeMap, BTreeSet};

/// Validated mesh snapshot handed to the checks.
///
/// Every node index in `triangles`, `quads` and `lines` is `< points.len()`,
/// and every tag index is valid for the block it names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub points: Vec<Point2>,

    /// Coordinates past the second, per point. Empty when the source was 2D.
    pub extra_coords: Vec<Vec<f64>>,

    pub triangles: Vec<[usize; 3]>,
    pub quads: Vec<[usize; 4]>,
    pub cell_tags: BTreeMap<String, CellTagIndices>,
    pub line_tags: BTreeMap<String, Vec<usize>>,
    pub lines: Option<Vec<[usize; 2]>>,
    pub physical_groups: Option<BTreeMap<String, u8>>,
    pub bbox: Aabb2,
}

impl MeshData {
    /// Bare connectivity with a computed bounding box. Indices are not
    /// checked; use [`MeshData::from_document`] for untrusted input.
    pub fn from_parts(points: Vec<Point2>, triangles: Vec<[usize; 3]>, quads: Vec<[usize; 4]>) -> Self {
        let bbox = Aabb2::from_points(points.iter().copied()).unwrap_or_default();
        Self {
            points,
            triangles,
            quads,
            bbox,
            ..Self::default()
        }
    }

    pub fn from_document(doc: MeshDocument) -> Result<Self, MeshLoadError> {
        let n_points = doc.points.len();

        let mut points = Vec::with_capacity(n_points);
        let mut extra_coords = Vec::with_capacity(n_points);
        for (index, coords) in doc.points.iter().enumerate() {
            match coords.as_slice() {
                [x, y, rest @ ..] => {
                    points.push([*x, *y]);
                    extra_coords.push(rest.to_vec());
                }
                _ => {
                    return Err(MeshLoadError::ShortPoint {
                        index,
                        found: coords.len(),
                    });
                }
            }
        }
        if extra_coords.iter().all(Vec::is_empty) {
            extra_coords.clear();
        }

        check_nodes("triangle", doc.triangles.iter().map(|c| c.as_slice()), n_points)?;
        check_nodes("quad", doc.quads.iter().map(|c| c.as_slice()), n_points)?;
        if let Some(lines) = &doc.lines {
            check_nodes("line", lines.iter().map(|c| c.as_slice()), n_points)?;
        }

        for (tag, idx) in &doc.cell_tags {
            check_tag(tag, "triangle", &idx.triangle, doc.triangles.len())?;
            check_tag(tag, "quad", &idx.quad, doc.quads.len())?;
        }
        // Line tags can only be checked against known line connectivity.
        if let Some(lines) = &doc.lines {
            for (tag, idx) in &doc.line_tags {
                check_tag(tag, "line", idx, lines.len())?;
            }
        }

        let bbox = match doc.bbox {
            Some(extents) => Aabb2::from_extents(extents),
            None => Aabb2::from_points(points.iter().copied()).unwrap_or_default(),
        };

        Ok(Self {
            points,
            extra_coords,
            triangles: doc.triangles,
            quads: doc.quads,
            cell_tags: doc.cell_tags,
            line_tags: doc.line_tags,
            lines: doc.lines,
            physical_groups: doc.physical_groups,
            bbox,
        })
    }

    pub fn to_document(&self) -> MeshDocument {
        let points = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let mut coords = p.to_vec();
                if let Some(extra) = self.extra_coords.get(i) {
                    coords.extend_from_slice(extra);
                }
                coords
            })
            .collect();

        MeshDocument {
            schema: Some(schema::MESHFIX_MESH_V1.to_string()),
            points,
            triangles: self.triangles.clone(),
            quads: self.quads.clone(),
            cell_tags: self.cell_tags.clone(),
            line_tags: self.line_tags.clone(),
            lines: self.lines.clone(),
            physical_groups: self.physical_groups.clone(),
            bbox: Some(self.bbox.to_extents()),
        }
    }

    pub fn n_tris(&self) -> usize {
        self.triangles.len()
    }

    pub fn n_quads(&self) -> usize {
        self.quads.len()
    }

    pub fn n_cells(&self) -> usize {
        self.triangles.len() + self.quads.len()
    }

    /// Unified ids (triangles first, then quads) named by any cell tag.
    pub fn tagged_cell_ids(&self) -> BTreeSet<usize> {
        let n_tris = self.n_tris();
        let mut out = BTreeSet::new();
        for idx in self.cell_tags.values() {
            out.extend(idx.triangle.iter().copied());
            out.extend(idx.quad.iter().map(|q| n_tris + q));
        }
        out
    }

    /// Boundary edges as canonical `(min, max)` pairs, when line connectivity
    /// is known.
    pub fn boundary_edges(&self) -> Option<BTreeSet<(usize, usize)>> {
        self.lines.as_ref().map(|lines| {
            lines
                .iter()
                .map(|[a, b]| ((*a).min(*b), (*a).max(*b)))
                .collect()
        })
    }
}

fn check_nodes<'a>(
    block: &'static str,
    cells: impl Iterator<Item = &'a [usize]>,
    n_points: usize,
) -> Result<(), MeshLoadError> {
    for (element, nodes) in cells.enumerate() {
        if let Some(&node) = nodes.iter().find(|&&n| n >= n_points) {
            return Err(MeshLoadError::NodeOutOfRange {
                block,
                element,
                node,
                n_points,
            });
        }
    }
    Ok(())
}

fn check_tag(tag: &str, block: &'static str, indices: &[usize], len: usize) -> Result<(), MeshLoadError> {
    match indices.iter().find(|&&i| i >= len) {
        Some(&index) => Err(MeshLoadError::TagOutOfRange {
            tag: tag.to_string(),
            block,
            index,
            len,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(points: Vec<Vec<f64>>) -> MeshDocument {
        MeshDocument {
            points,
            ..MeshDocument::default()
        }
    }

    #[test]
    fn extra_coordinates_are_kept_but_not_used() {
        let mut d = doc(vec![vec![0.0, 0.0, 1.0], vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 1.0]]);
        d.triangles = vec![[0, 1, 2]];
        let mesh = MeshData::from_document(d).expect("valid");
        assert_eq!(mesh.points[1], [1.0, 0.0]);
        assert_eq!(mesh.extra_coords[1], vec![1.0]);
        assert_eq!(mesh.to_document().points[1], vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn planar_points_have_no_extra_coords() {
        let mesh = MeshData::from_document(doc(vec![vec![0.0, 0.0], vec![1.0, 2.0]])).expect("valid");
        assert!(mesh.extra_coords.is_empty());
        assert_eq!(mesh.bbox.to_extents(), [0.0, 1.0, 0.0, 2.0]);
    }

    #[test]
    fn short_point_is_rejected() {
        let err = MeshData::from_document(doc(vec![vec![0.0, 0.0], vec![3.0]])).expect_err("short");
        assert_eq!(err, MeshLoadError::ShortPoint { index: 1, found: 1 });
    }

    #[test]
    fn out_of_range_node_is_rejected() {
        let mut d = doc(vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]]);
        d.quads = vec![[0, 1, 2, 3]];
        let err = MeshData::from_document(d).expect_err("bad node");
        assert_eq!(
            err,
            MeshLoadError::NodeOutOfRange {
                block: "quad",
                element: 0,
                node: 3,
                n_points: 3
            }
        );
    }

    #[test]
    fn out_of_range_tag_is_rejected() {
        let mut d = doc(vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]]);
        d.triangles = vec![[0, 1, 2]];
        d.cell_tags.insert(
            "fluid".to_string(),
            CellTagIndices {
                triangle: vec![0, 1],
                quad: vec![],
            },
        );
        let err = MeshData::from_document(d).expect_err("bad tag");
        assert!(err.to_string().contains("fluid"));
    }

    #[test]
    fn line_tags_are_unchecked_without_lines() {
        let mut d = doc(vec![vec![0.0, 0.0], vec![1.0, 0.0]]);
        d.line_tags.insert("airfoil".to_string(), vec![7]);
        assert!(MeshData::from_document(d).is_ok());
    }

    #[test]
    fn tagged_ids_use_unified_numbering() {
        let mut mesh = MeshData::from_parts(
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [2.0, 0.0], [2.0, 1.0]],
            vec![[0, 1, 2], [0, 2, 3]],
            vec![[1, 4, 5, 2]],
        );
        mesh.cell_tags.insert(
            "fluid".to_string(),
            CellTagIndices {
                triangle: vec![1],
                quad: vec![0],
            },
        );
        assert_eq!(mesh.tagged_cell_ids().into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn boundary_edges_are_canonical() {
        let mut mesh = MeshData::from_parts(vec![[0.0, 0.0], [1.0, 0.0]], vec![], vec![]);
        assert!(mesh.boundary_edges().is_none());
        mesh.lines = Some(vec![[1, 0]]);
        assert_eq!(
            mesh.boundary_edges().map(|s| s.into_iter().collect::<Vec<_>>()),
            Some(vec![(0, 1)])
        );
    }
}
