//! Mesh ingestion.
//!
//! The mesh generator is an external collaborator. This crate defines what
//! the checks need from it ([`MeshData`]) and ships one concrete reader: a
//! JSON mesh document. The loader is tolerant of extra fields but strict about
//! indices, so everything downstream can index arrays without bounds checks
//! failing.

mod data;
mod document;
mod load;

pub use data::MeshData;
pub use document::{CellTagIndices, MeshDocument};
pub use load::{MeshLoadError, load_mesh, parse_mesh, render_mesh};
