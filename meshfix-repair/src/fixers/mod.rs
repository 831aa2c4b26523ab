use crate::error::RepairResult;
use meshfix_mesh::MeshData;
use meshfix_types::{Finding, RulePolicy};

mod duplicates;
mod multi_edges;
mod orientation;

pub use duplicates::DuplicateElementsFixer;
pub use multi_edges::MultipleEdgesFixer;
pub use orientation::SurfaceOrientationFixer;

/// What one fixer did to the mesh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixResult {
    pub applied: usize,
    /// Reported problems the fixer looked at and left alone.
    pub waived: usize,
    pub notes: String,
}

impl FixResult {
    pub fn applied(count: usize, notes: impl Into<String>) -> Self {
        Self {
            applied: count,
            waived: 0,
            notes: notes.into(),
        }
    }
}

pub trait Fixer {
    /// Rule id whose finding triggers this fixer.
    fn rule_id(&self) -> &'static str;

    fn fix(&self, mesh: &mut MeshData, finding: &Finding, policy: &RulePolicy) -> RepairResult<FixResult>;
}

/// Topology fixes first, then orientation.
pub fn builtin_fixers() -> Vec<Box<dyn Fixer>> {
    vec![
        Box::new(DuplicateElementsFixer),
        Box::new(MultipleEdgesFixer),
        Box::new(SurfaceOrientationFixer),
    ]
}
