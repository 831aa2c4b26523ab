//! Check, repair and re-check against real files in a temp directory.

use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use meshfix_core::{
    CheckSettings, FsMeshSource, FsWritePort, RepairSettings, backup_path, repair_log_path,
    run_checks, run_repair, write_check_artifacts,
};
use meshfix_types::{CheckReport, RepairLog, ToolInfo};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

const BROKEN_FAN: &str = r#"{
  "points": [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [2.0, 0.0], [2.0, 1.0]],
  "triangles": [[0, 1, 2], [0, 3, 2], [1, 4, 5], [2, 1, 0], [1, 5, 2]],
  "cell_tags": {"fluid": {"triangle": [0, 1, 2, 3, 4]}}
}
"#;

fn workspace(temp: &TempDir) -> Utf8PathBuf {
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8 temp dir");
    fs::write(root.join("fan.json"), BROKEN_FAN).expect("write mesh");
    root
}

fn tool() -> ToolInfo {
    ToolInfo {
        name: "meshfix".into(),
        version: "test".into(),
    }
}

fn check(path: &Utf8Path) -> CheckReport {
    run_checks(&CheckSettings::new(path), &FsMeshSource).expect("run checks")
}

#[test]
fn repair_in_place_fixes_the_fan() {
    let temp = TempDir::new().expect("temp dir");
    let root = workspace(&temp);
    let mesh_path = root.join("fan.json");

    let before = check(&mesh_path);
    assert!(!before.ok);
    assert_eq!(
        before.failing_rules(),
        vec!["surface_orientation", "duplicate_elements", "nonmanifold"]
    );

    let mut settings = RepairSettings::new(mesh_path.clone(), before.rules.clone());
    settings.dry_run = false;
    settings.plan_overrides = json!({"verify": true});
    let outcome = run_repair(&settings, &FsMeshSource, Some(&FsWritePort), tool()).expect("repair");

    let applied: Vec<(&str, usize)> = outcome
        .applied
        .iter()
        .map(|e| (e.rule.as_str(), e.count))
        .collect();
    assert_eq!(applied, vec![("duplicate_elements", 1), ("surface_orientation", 1)]);
    assert!(outcome.ok);
    assert_eq!(outcome.verified.as_ref().map(|v| v.ok), Some(true));

    // The original bytes survive next to the rewritten mesh.
    let backup = backup_path(&mesh_path);
    assert_eq!(fs::read_to_string(&backup).expect("read backup"), BROKEN_FAN);

    let log_path = repair_log_path(&mesh_path);
    assert_eq!(outcome.log.as_deref(), Some(log_path.as_str()));
    let log: RepairLog =
        serde_json::from_str(&fs::read_to_string(&log_path).expect("read log")).expect("parse log");
    assert_eq!(log.tool.name, "meshfix");
    assert_eq!(log.applied, outcome.applied);
    assert_eq!(log.input_sha256.as_ref().map(String::len), Some(64));

    let after = check(&mesh_path);
    assert!(after.ok, "still failing: {:?}", after.failing_rules());
    assert_eq!(after.meta.n_tris, 4);
}

#[test]
fn dry_run_leaves_the_file_alone() {
    let temp = TempDir::new().expect("temp dir");
    let root = workspace(&temp);
    let mesh_path = root.join("fan.json");

    let report = check(&mesh_path);
    let settings = RepairSettings::new(mesh_path.clone(), report.rules);
    let outcome = run_repair(&settings, &FsMeshSource, Some(&FsWritePort), tool()).expect("repair");

    assert_eq!(outcome.msh_path, mesh_path.as_str());
    assert_eq!(outcome.log, None);
    assert_eq!(fs::read_to_string(&mesh_path).expect("read mesh"), BROKEN_FAN);
    assert!(!backup_path(&mesh_path).exists());
}

#[test]
fn check_report_lands_in_nested_directory() {
    let temp = TempDir::new().expect("temp dir");
    let root = workspace(&temp);
    let report = check(&root.join("fan.json"));

    let out = root.join("artifacts").join("meshfix").join("report.json");
    write_check_artifacts(&report, &out, &FsWritePort).expect("write report");
    let back: CheckReport =
        serde_json::from_str(&fs::read_to_string(&out).expect("read report")).expect("parse report");
    assert_eq!(back, report);
}

#[test]
fn missing_mesh_is_a_tool_error() {
    let temp = TempDir::new().expect("temp dir");
    let root = workspace(&temp);
    let err = run_checks(&CheckSettings::new(root.join("absent.json")), &FsMeshSource)
        .expect_err("missing file");
    assert_eq!(err.exit_code(), 1);
    assert!(err.to_string().contains("absent.json"));
}
