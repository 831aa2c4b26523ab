use crate::finding::RuleFindings;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Output of one validation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    /// False iff some error-tier rule failed.
    pub ok: bool,
    pub rules: RuleFindings,
    pub meta: CheckMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckMeta {
    pub mesh_path: String,
    pub n_points: usize,
    pub n_tris: usize,
    pub n_quads: usize,

    /// Effective thresholds after merging user configuration.
    #[serde(default)]
    pub thresholds: Value,

    /// Effective enable map after merging user configuration.
    #[serde(default)]
    pub enabled: BTreeMap<String, bool>,
}

impl CheckReport {
    /// Ids of error-tier rules that reported violations, in execution order.
    pub fn failing_rules(&self) -> Vec<String> {
        self.rules
            .iter()
            .filter(|f| f.is_blocking())
            .map(|f| f.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::{Example, Finding, Severity};

    #[test]
    fn failing_rules_ignores_warnings() {
        let mut rules = RuleFindings::new();
        rules.push(
            Finding::new("surface_orientation", Severity::Error, true)
                .with_violations(1, vec![Example::Index(0)]),
        );
        rules.push(
            Finding::new("tiny_elements", Severity::Warn, true)
                .with_violations(4, vec![Example::Index(2)]),
        );
        rules.push(Finding::new("duplicate_elements", Severity::Error, true));

        let report = CheckReport {
            ok: false,
            rules,
            meta: CheckMeta {
                mesh_path: "m.json".to_string(),
                n_points: 4,
                n_tris: 2,
                n_quads: 0,
                thresholds: Value::Null,
                enabled: BTreeMap::new(),
            },
        };
        assert_eq!(report.failing_rules(), vec!["surface_orientation".to_string()]);
    }
}
