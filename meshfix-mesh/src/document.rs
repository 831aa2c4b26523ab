use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-type element indices carried by a cell tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellTagIndices {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triangle: Vec<usize>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quad: Vec<usize>,
}

/// On-disk JSON form of a mesh.
///
/// Only `points` is required. Unknown fields are ignored so documents written
/// by newer exporters still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    pub points: Vec<Vec<f64>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triangles: Vec<[usize; 3]>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quads: Vec<[usize; 4]>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cell_tags: BTreeMap<String, CellTagIndices>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub line_tags: BTreeMap<String, Vec<usize>>,

    /// Line connectivity. Absent means the boundary is unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<[usize; 2]>>,

    /// Tag catalog: physical group name to dimension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_groups: Option<BTreeMap<String, u8>>,

    /// `[xmin, xmax, ymin, ymax]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
}
