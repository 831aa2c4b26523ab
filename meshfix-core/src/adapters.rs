//! Default filesystem-backed and in-memory port implementations.

use crate::ports::{LoadedMesh, MeshSource, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use meshfix_mesh::{MeshData, parse_mesh, render_mesh};
use std::collections::BTreeMap;
use tracing::debug;

/// Reads JSON mesh documents from disk.
#[derive(Debug, Clone, Default)]
pub struct FsMeshSource;

impl MeshSource for FsMeshSource {
    fn read_mesh(&self, path: &Utf8Path) -> anyhow::Result<LoadedMesh> {
        let bytes = fs::read(path).with_context(|| format!("read mesh {}", path))?;
        let text = std::str::from_utf8(&bytes).with_context(|| format!("decode mesh {}", path))?;
        let mesh = parse_mesh(text).with_context(|| format!("parse mesh {}", path))?;
        debug!(
            path = %path,
            n_points = mesh.points.len(),
            n_cells = mesh.n_cells(),
            "mesh read"
        );
        Ok(LoadedMesh { bytes, mesh })
    }
}

/// Pre-rendered meshes keyed by path, for embedding and testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMeshSource {
    meshes: BTreeMap<Utf8PathBuf, Vec<u8>>,
}

impl InMemoryMeshSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `mesh` as the JSON document a filesystem source would read.
    pub fn with_mesh(mut self, path: impl Into<Utf8PathBuf>, mesh: &MeshData) -> anyhow::Result<Self> {
        let text = render_mesh(mesh).context("render mesh")?;
        self.meshes.insert(path.into(), text.into_bytes());
        Ok(self)
    }
}

impl MeshSource for InMemoryMeshSource {
    fn read_mesh(&self, path: &Utf8Path) -> anyhow::Result<LoadedMesh> {
        let bytes = self
            .meshes
            .get(path)
            .cloned()
            .with_context(|| format!("no in-memory mesh at {}", path))?;
        let text = std::str::from_utf8(&bytes).with_context(|| format!("decode mesh {}", path))?;
        let mesh = parse_mesh(text).with_context(|| format!("parse mesh {}", path))?;
        Ok(LoadedMesh { bytes, mesh })
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}
