use crate::cache::MeshCache;
use crate::config::Thresholds;
use crate::rules::{errors, warnings};
use crate::view::MeshView;
use meshfix_types::{Finding, Severity};
use std::collections::BTreeMap;
use thiserror::Error;

/// Rule contract: a pure function over the view, thresholds and cache.
pub type CheckFn = fn(&MeshView<'_>, &Thresholds, &MeshCache) -> Finding;

/// Execution order. Topology and validity first, then coverage, then quality,
/// then tagging.
pub const RULES_ORDER: &[&str] = &[
    "surface_orientation",
    "negative_jacobians",
    "duplicate_elements",
    "multiple_edges",
    "nonmanifold",
    "overlapping_elements",
    "uncovered_faces",
    "missing_internal_faces",
    "missing_physical_groups",
    "bl_continuity",
    "two_single_edges",
    "tiny_elements",
    "min_angle_tris",
    "quad_skewness_orthogonality",
    "grading_spikes",
    "first_layer_height",
    "boundary_coverage",
    "untagged_entities",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate rule id in registry: {id}")]
    Duplicate { id: String },

    #[error("invalid severity for {id}: {severity}")]
    InvalidSeverity { id: String, severity: String },
}

#[derive(Clone)]
pub struct RuleSpec {
    pub id: String,
    pub check: CheckFn,
    pub severity: Severity,
    pub fixable: bool,
}

impl std::fmt::Debug for RuleSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSpec")
            .field("id", &self.id)
            .field("severity", &self.severity)
            .field("fixable", &self.fixable)
            .finish_non_exhaustive()
    }
}

/// Immutable id to rule table.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    specs: BTreeMap<String, RuleSpec>,
}

impl RuleRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn get(&self, id: &str) -> Option<&RuleSpec> {
        self.specs.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleSpec> {
        self.specs.values()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Collects rule declarations and validates them all at [`build`](Self::build).
#[derive(Default)]
pub struct RegistryBuilder {
    pending: Vec<(String, CheckFn, String, bool)>,
}

impl RegistryBuilder {
    /// `severity` is checked at build time; only `"error"` and `"warn"` pass.
    pub fn rule(mut self, id: &str, check: CheckFn, severity: &str, fixable: bool) -> Self {
        self.pending
            .push((id.to_string(), check, severity.to_string(), fixable));
        self
    }

    pub fn build(self) -> Result<RuleRegistry, RegistryError> {
        let mut specs = BTreeMap::new();
        for (id, check, severity, fixable) in self.pending {
            if specs.contains_key(&id) {
                return Err(RegistryError::Duplicate { id });
            }
            let severity = severity
                .parse::<Severity>()
                .map_err(|e| RegistryError::InvalidSeverity {
                    id: id.clone(),
                    severity: e.0,
                })?;
            specs.insert(
                id.clone(),
                RuleSpec {
                    id,
                    check,
                    severity,
                    fixable,
                },
            );
        }
        Ok(RuleRegistry { specs })
    }
}

pub fn builtin_registry() -> Result<RuleRegistry, RegistryError> {
    RuleRegistry::builder()
        .rule("surface_orientation", errors::surface_orientation, "error", true)
        .rule("negative_jacobians", errors::negative_jacobians, "error", true)
        .rule("duplicate_elements", errors::duplicate_elements, "error", true)
        .rule("multiple_edges", errors::multiple_edges, "error", true)
        .rule("nonmanifold", errors::nonmanifold, "error", true)
        .rule("overlapping_elements", errors::overlapping_elements, "error", true)
        .rule("uncovered_faces", errors::uncovered_faces, "error", true)
        .rule("missing_internal_faces", errors::missing_internal_faces, "error", true)
        .rule("bl_continuity", errors::bl_continuity, "error", true)
        .rule("missing_physical_groups", errors::missing_physical_groups, "error", false)
        .rule("two_single_edges", warnings::two_single_edges, "warn", true)
        .rule("tiny_elements", warnings::tiny_elements, "warn", true)
        .rule("min_angle_tris", warnings::min_angle_tris, "warn", true)
        .rule(
            "quad_skewness_orthogonality",
            warnings::quad_skewness_orthogonality,
            "warn",
            true,
        )
        .rule("grading_spikes", warnings::grading_spikes, "warn", true)
        .rule("first_layer_height", warnings::first_layer_height, "warn", false)
        .rule("boundary_coverage", warnings::boundary_coverage, "warn", true)
        .rule("untagged_entities", warnings::untagged_entities, "warn", true)
        .build()
}

/// `RULES_ORDER` filtered by an enable map. Absent ids default to enabled;
/// ids not in `RULES_ORDER` are ignored.
pub fn get_enabled_ids(enabled: &BTreeMap<String, bool>) -> Vec<&'static str> {
    RULES_ORDER
        .iter()
        .copied()
        .filter(|id| enabled.get(*id).copied().unwrap_or(true))
        .collect()
}
