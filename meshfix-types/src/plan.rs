//! Repair policy: what each fixer is allowed to do.

use crate::merge::deep_merge;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Actions that turn a fixer off.
pub const DISABLED_ACTIONS: &[&str] = &["skip", "disabled", "off"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairPlan {
    #[serde(default)]
    pub rules: BTreeMap<String, RulePolicy>,

    /// Re-check the repaired mesh before reporting.
    #[serde(default)]
    pub verify: bool,

    #[serde(default)]
    pub write_in_place: bool,

    #[serde(default = "default_true")]
    pub keep_backup: bool,
}

fn default_true() -> bool {
    true
}

/// Per-rule policy. `action` is interpreted by the fixer; everything else is
/// kept verbatim as fixer options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulePolicy {
    #[serde(default)]
    pub action: String,

    #[serde(flatten)]
    pub options: BTreeMap<String, Value>,
}

impl RulePolicy {
    pub fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
            options: BTreeMap::new(),
        }
    }

    pub fn with_option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    pub fn is_disabled(&self) -> bool {
        let action = self.action.trim().to_ascii_lowercase();
        DISABLED_ACTIONS.contains(&action.as_str())
    }

    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }
}

impl Default for RepairPlan {
    fn default() -> Self {
        let mut rules = BTreeMap::new();
        rules.insert(
            "duplicate_elements".to_string(),
            RulePolicy::new("remove").with_option("prefer", "first"),
        );
        rules.insert("multiple_edges".to_string(), RulePolicy::new("dedupe"));
        rules.insert(
            "surface_orientation".to_string(),
            RulePolicy::new("reorient").with_option("target", "CCW"),
        );
        Self {
            rules,
            verify: false,
            write_in_place: false,
            keep_backup: true,
        }
    }
}

impl RepairPlan {
    /// Deep-merge `overrides` (any JSON object, possibly partial) over this
    /// plan and return the result. Neither input is modified.
    pub fn merged(&self, overrides: &Value) -> Result<RepairPlan, serde_json::Error> {
        let base = serde_json::to_value(self)?;
        serde_json::from_value(deep_merge(&base, overrides))
    }

    pub fn rule(&self, id: &str) -> Option<&RulePolicy> {
        self.rules.get(id)
    }
}
