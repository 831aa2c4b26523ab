use crate::plan::RepairPlan;
use crate::schema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixEntry {
    pub rule: String,
    pub count: usize,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub rule: String,
    pub reason: String,
}

/// Result of re-checking a repaired mesh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifySummary {
    pub ok: bool,

    /// Error-tier rules still failing after repair.
    #[serde(default)]
    pub failing: Vec<String>,
}

/// Summary returned by a repair pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairOutcome {
    pub ok: bool,

    /// Where the mesh lives after the pass. Equals the input on dry runs.
    pub msh_path: String,

    #[serde(default)]
    pub applied: Vec<FixEntry>,

    #[serde(default)]
    pub skipped: Vec<SkippedEntry>,

    #[serde(default)]
    pub waived: Vec<FixEntry>,

    /// Audit log path, `null` on dry runs.
    pub log: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<VerifySummary>,
}

impl RepairOutcome {
    pub fn total_applied(&self) -> usize {
        self.applied.iter().map(|e| e.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Audit record written next to a repaired mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairLog {
    pub schema: String,
    pub tool: ToolInfo,

    /// RFC 3339 timestamp.
    pub generated_at: String,

    /// Hex SHA-256 of the input mesh bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_sha256: Option<String>,

    pub applied: Vec<FixEntry>,
    pub skipped: Vec<SkippedEntry>,
    pub waived: Vec<FixEntry>,
    pub plan: RepairPlan,
}

impl RepairLog {
    pub fn new(tool: ToolInfo, generated_at: String, plan: RepairPlan) -> Self {
        Self {
            schema: schema::MESHFIX_REPAIR_LOG_V1.to_string(),
            tool,
            generated_at,
            input_sha256: None,
            applied: Vec::new(),
            skipped: Vec::new(),
            waived: Vec::new(),
            plan,
        }
    }
}
