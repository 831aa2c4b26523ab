//! Embeddable core library for meshfix.
//!
//! Provides a clap-free, I/O-abstracted entry point for hosts that want mesh
//! checks and repairs without the CLI.
//!
//! # Port traits
//!
//! All I/O goes through the traits in [`ports`]:
//! - [`MeshSource`](ports::MeshSource) reads and parses a mesh
//! - [`WritePort`](ports::WritePort) writes files and creates directories
//!
//! The [`adapters`] module provides filesystem and in-memory implementations.
//!
//! # Entry points
//!
//! - [`run_checks`](pipeline::run_checks) validates a mesh
//! - [`run_repair`](pipeline::run_repair) applies fixers for a set of findings

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use meshfix_checks::{CheckConfig, Thresholds};
pub use meshfix_types::{CheckReport, RepairOutcome, RepairPlan, RuleFindings};
pub use adapters::{FsMeshSource, FsWritePort, InMemoryMeshSource};
pub use pipeline::{
    ToolError, backup_path, repair_log_path, run_checks, run_repair, write_check_artifacts,
};
pub use ports::{LoadedMesh, MeshSource, WritePort};
pub use settings::{CheckSettings, RepairSettings};
