//! Clap-free settings for the check and repair pipelines.

use camino::Utf8PathBuf;
use meshfix_types::RuleFindings;
use serde_json::Value;

/// Settings for the check pipeline.
#[derive(Debug, Clone)]
pub struct CheckSettings {
    pub mesh_path: Utf8PathBuf,

    /// `{"enabled": {...}, "thresholds": {...}}`, deep-merged over the
    /// defaults. `Value::Null` keeps the defaults.
    pub overrides: Value,
}

impl CheckSettings {
    pub fn new(mesh_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            mesh_path: mesh_path.into(),
            overrides: Value::Null,
        }
    }
}

/// Settings for the repair pipeline.
#[derive(Debug, Clone)]
pub struct RepairSettings {
    pub mesh_path: Utf8PathBuf,

    /// Findings from an earlier check pass, keyed by rule id.
    pub findings: RuleFindings,

    /// Deep-merged over the default repair plan.
    pub plan_overrides: Value,

    /// In-memory edits only; nothing is written.
    pub dry_run: bool,

    /// Destination of the repaired mesh. Defaults to `mesh_path`.
    pub out_path: Option<Utf8PathBuf>,

    /// Check configuration used when the plan asks for verification.
    pub check_overrides: Value,
}

impl RepairSettings {
    pub fn new(mesh_path: impl Into<Utf8PathBuf>, findings: RuleFindings) -> Self {
        Self {
            mesh_path: mesh_path.into(),
            findings,
            plan_overrides: Value::Null,
            dry_run: true,
            out_path: None,
            check_overrides: Value::Null,
        }
    }

    pub fn output_path(&self) -> Utf8PathBuf {
        self.out_path
            .clone()
            .unwrap_or_else(|| self.mesh_path.clone())
    }
}
