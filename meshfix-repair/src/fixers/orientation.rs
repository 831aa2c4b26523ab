use crate::edit::{cell_signed_area, reorient_cells};
use crate::error::{RepairError, RepairResult};
use crate::fixers::{FixResult, Fixer};
use meshfix_mesh::MeshData;
use meshfix_types::{CellKind, Finding, RulePolicy};

/// Flips the cells a `surface_orientation` finding reported.
///
/// Examples are re-checked against the live mesh first: an example whose
/// cell is gone or already counter-clockwise (say after an earlier fixer
/// renumbered the block) is waived instead of flipped.
pub struct SurfaceOrientationFixer;

impl SurfaceOrientationFixer {
    const RULE_ID: &'static str = "surface_orientation";

    fn check_target(policy: &RulePolicy) -> RepairResult<()> {
        match policy.option_str("target") {
            None => Ok(()),
            Some(t) if t.eq_ignore_ascii_case("ccw") => Ok(()),
            Some(other) => Err(RepairError::InvalidOption {
                rule: Self::RULE_ID.to_string(),
                key: "target".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl Fixer for SurfaceOrientationFixer {
    fn rule_id(&self) -> &'static str {
        Self::RULE_ID
    }

    fn fix(&self, mesh: &mut MeshData, finding: &Finding, policy: &RulePolicy) -> RepairResult<FixResult> {
        Self::check_target(policy)?;

        let mut tris = Vec::new();
        let mut quads = Vec::new();
        let mut waived = 0;
        for (kind, index) in finding.examples.iter().filter_map(|e| e.as_cell()) {
            match cell_signed_area(mesh, kind, index) {
                Some(area) if area < 0.0 => match kind {
                    CellKind::Tri => tris.push(index),
                    CellKind::Quad => quads.push(index),
                },
                _ => waived += 1,
            }
        }

        let applied = reorient_cells(mesh, CellKind::Tri, &tris)? + reorient_cells(mesh, CellKind::Quad, &quads)?;
        let notes = if applied > 0 {
            format!("Reoriented {applied} cells.")
        } else {
            "No cells to reorient.".to_string()
        };
        Ok(FixResult {
            applied,
            waived,
            notes,
        })
    }
}
