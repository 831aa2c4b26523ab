//! Targeted repairs driven by check findings.
//!
//! Fixers never trust the indices in a finding for destructive edits; they
//! recompute what to delete from the live connectivity.

mod edit;
mod error;
mod fixers;

pub use edit::{cell_signed_area, remove_cells, reorient_cells};
pub use error::{RepairError, RepairResult};
pub use fixers::{
    DuplicateElementsFixer, FixResult, Fixer, MultipleEdgesFixer, SurfaceOrientationFixer,
    builtin_fixers,
};
