//! Port traits abstracting all I/O away from the pipeline.

use camino::Utf8Path;
use meshfix_mesh::MeshData;

/// A mesh as read from its source: the exact bytes and the parsed form.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedMesh {
    pub bytes: Vec<u8>,
    pub mesh: MeshData,
}

/// Source of meshes.
pub trait MeshSource {
    fn read_mesh(&self, path: &Utf8Path) -> anyhow::Result<LoadedMesh>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
