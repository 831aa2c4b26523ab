use meshfix_types::finding::{CellKind, Example, Finding, RuleFindings, Severity};
use meshfix_types::plan::RepairPlan;
use meshfix_types::repair::{RepairLog, ToolInfo};
use meshfix_types::report::{CheckMeta, CheckReport};
use std::collections::BTreeMap;

#[test]
fn repair_log_new_sets_schema_and_defaults() {
    let tool = ToolInfo {
        name: "meshfix".to_string(),
        version: "0.1.0".to_string(),
    };
    let log = RepairLog::new(
        tool.clone(),
        "2026-01-01T00:00:00+00:00".to_string(),
        RepairPlan::default(),
    );

    assert_eq!(log.schema, meshfix_types::schema::MESHFIX_REPAIR_LOG_V1);
    assert_eq!(log.tool, tool);
    assert!(log.input_sha256.is_none());
    assert!(log.applied.is_empty());
    assert!(log.skipped.is_empty());
    assert!(log.waived.is_empty());
    assert!(log.plan.keep_backup);

    let value = serde_json::to_value(&log).expect("serialize log");
    assert!(value.get("input_sha256").is_none());
}

#[test]
fn repair_plan_fills_missing_fields_from_serde_defaults() {
    let plan: RepairPlan = serde_json::from_str("{}").expect("parse empty plan");
    assert!(plan.rules.is_empty());
    assert!(!plan.verify);
    assert!(!plan.write_in_place);
    assert!(plan.keep_backup);
}

#[test]
fn check_report_round_trips_with_rule_ids_as_keys() {
    let mut rules = RuleFindings::new();
    rules.push(
        Finding::new("duplicate_elements", Severity::Error, true)
            .with_violations(1, vec![Example::cell(CellKind::Tri, 5)])
            .with_detail("groups", 1),
    );
    rules.push(Finding::new("untagged_entities", Severity::Warn, false));

    let report = CheckReport {
        ok: false,
        rules,
        meta: CheckMeta {
            mesh_path: "square.json".to_string(),
            n_points: 4,
            n_tris: 6,
            n_quads: 0,
            thresholds: serde_json::json!({"min_angle_deg": 20.0}),
            enabled: BTreeMap::from([("overlapping_elements".to_string(), false)]),
        },
    };

    let value = serde_json::to_value(&report).expect("serialize");
    assert_eq!(
        value["rules"]["duplicate_elements"]["examples"],
        serde_json::json!([["tri", 5]])
    );
    assert_eq!(value["rules"]["untagged_entities"]["severity"], "warn");
    assert_eq!(value["meta"]["enabled"]["overlapping_elements"], false);

    let back: CheckReport = serde_json::from_value(value).expect("parse");
    assert_eq!(back, report);
}

#[test]
fn findings_file_without_ids_takes_ids_from_keys() {
    let json = r#"{
        "surface_orientation": {
            "severity": "error", "ok": false, "count": 1,
            "examples": [["quad", 0]], "fixable": true
        }
    }"#;
    let rules: RuleFindings = serde_json::from_str(json).expect("parse");
    let finding = rules.get("surface_orientation").expect("finding");
    assert_eq!(finding.id, "surface_orientation");
    assert_eq!(finding.examples[0].as_cell(), Some((CellKind::Quad, 0)));
    assert!(finding.details.is_empty());
}
