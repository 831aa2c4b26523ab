use crate::data::MeshData;
use crate::document::MeshDocument;
use camino::Utf8Path;
use fs_err as fs;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshLoadError {
    #[error("io error: {message}")]
    Io { message: String },

    #[error("json parse error: {message}")]
    Json { message: String },

    #[error("point {index} has {found} coordinate(s), at least 2 required")]
    ShortPoint { index: usize, found: usize },

    #[error("{block} {element} references node {node}, but the mesh has {n_points} points")]
    NodeOutOfRange {
        block: &'static str,
        element: usize,
        node: usize,
        n_points: usize,
    },

    #[error("tag '{tag}' references {block} {index}, but only {len} exist")]
    TagOutOfRange {
        tag: String,
        block: &'static str,
        index: usize,
        len: usize,
    },
}

pub fn parse_mesh(contents: &str) -> Result<MeshData, MeshLoadError> {
    let doc: MeshDocument = serde_json::from_str(contents).map_err(|e| MeshLoadError::Json {
        message: e.to_string(),
    })?;
    MeshData::from_document(doc)
}

pub fn load_mesh(path: &Utf8Path) -> Result<MeshData, MeshLoadError> {
    debug!(path = %path, "loading mesh");
    let contents = fs::read_to_string(path).map_err(|e| MeshLoadError::Io {
        message: e.to_string(),
    })?;
    let mesh = parse_mesh(&contents)?;
    debug!(
        path = %path,
        n_points = mesh.points.len(),
        n_tris = mesh.n_tris(),
        n_quads = mesh.n_quads(),
        "mesh loaded"
    );
    Ok(mesh)
}

/// Pretty JSON document for `mesh`, newline-terminated.
pub fn render_mesh(mesh: &MeshData) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(&mesh.to_document())?;
    out.push('\n');
    Ok(out)
}
