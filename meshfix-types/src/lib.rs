//! Shared DTOs (schemas-as-code) for the meshfix workspace.
//!
//! # Design constraints
//! - Findings and repair results are consumed by other tools; field names are part of the contract.
//! - Prefer adding optional fields over changing semantics.

pub mod finding;
pub mod merge;
pub mod plan;
pub mod repair;
pub mod report;

pub use finding::{CellKind, Edge, Example, Finding, MAX_EXAMPLES, RuleFindings, Severity};
pub use merge::deep_merge;
pub use plan::{RepairPlan, RulePolicy};
pub use repair::{FixEntry, RepairLog, RepairOutcome, SkippedEntry, ToolInfo, VerifySummary};
pub use report::{CheckMeta, CheckReport};

/// Schema identifiers.
pub mod schema {
    pub const MESHFIX_REPAIR_LOG_V1: &str = "meshfix.repair_log.v1";
    pub const MESHFIX_MESH_V1: &str = "meshfix.mesh.v1";
}
