use crate::edit::remove_cells;
use crate::error::{RepairError, RepairResult};
use crate::fixers::{FixResult, Fixer};
use meshfix_mesh::MeshData;
use meshfix_types::{CellKind, Finding, RulePolicy};
use std::collections::BTreeMap;

/// Removes cells whose node sets repeat, keeping one per group.
pub struct DuplicateElementsFixer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keep {
    First,
    Last,
}

impl DuplicateElementsFixer {
    const RULE_ID: &'static str = "duplicate_elements";

    fn keep(policy: &RulePolicy) -> RepairResult<Keep> {
        match policy.option_str("prefer").map(str::to_ascii_lowercase).as_deref() {
            None | Some("first") => Ok(Keep::First),
            Some("last") => Ok(Keep::Last),
            Some(other) => Err(RepairError::InvalidOption {
                rule: Self::RULE_ID.to_string(),
                key: "prefer".to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// Redundant local indices, recomputed from the live connectivity.
    fn redundant<const N: usize>(cells: &[[usize; N]], keep: Keep) -> Vec<usize> {
        let mut groups: BTreeMap<[usize; N], Vec<usize>> = BTreeMap::new();
        for (i, cell) in cells.iter().enumerate() {
            let mut key = *cell;
            key.sort_unstable();
            groups.entry(key).or_default().push(i);
        }

        let mut out: Vec<usize> = groups
            .into_values()
            .filter(|g| g.len() > 1)
            .flat_map(|mut g| {
                match keep {
                    Keep::First => g.remove(0),
                    Keep::Last => g.remove(g.len() - 1),
                };
                g
            })
            .collect();
        out.sort_unstable();
        out
    }
}

impl Fixer for DuplicateElementsFixer {
    fn rule_id(&self) -> &'static str {
        Self::RULE_ID
    }

    fn fix(&self, mesh: &mut MeshData, _finding: &Finding, policy: &RulePolicy) -> RepairResult<FixResult> {
        let keep = Self::keep(policy)?;
        let tris = Self::redundant(&mesh.triangles, keep);
        let quads = Self::redundant(&mesh.quads, keep);

        let removed = remove_cells(mesh, CellKind::Tri, &tris)? + remove_cells(mesh, CellKind::Quad, &quads)?;
        let notes = if removed == 0 {
            "No duplicates after reconfirmation.".to_string()
        } else {
            format!("Removed {removed} duplicate elements.")
        };
        Ok(FixResult::applied(removed, notes))
    }
}
