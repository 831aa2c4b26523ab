//! Check and repair pipelines, extracted from the CLI.
//!
//! These entry points are I/O-agnostic: every read goes through a
//! [`MeshSource`] and every write through a [`WritePort`].

use crate::ports::{MeshSource, WritePort};
use crate::settings::{CheckSettings, RepairSettings};
use anyhow::Context;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use chrono::Utc;
use meshfix_checks::{CheckConfig, Checker};
use meshfix_mesh::{MeshData, render_mesh};
use meshfix_repair::{RepairError, builtin_fixers};
use meshfix_types::{
    CheckReport, FixEntry, RepairLog, RepairOutcome, RepairPlan, RulePolicy, SkippedEntry,
    ToolInfo, VerifySummary,
};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// Error type for pipeline results. Exit code 2 = validation failed or plan
/// rejected, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("validation failed: {}", failing.join(", "))]
    ValidationFailed { failing: Vec<String> },

    #[error(transparent)]
    Repair(#[from] RepairError),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::ValidationFailed { .. } => 2,
            ToolError::Repair(err) => err.exit_code(),
            ToolError::Internal(_) => 1,
        }
    }
}

fn check_config(overrides: &Value) -> anyhow::Result<CheckConfig> {
    CheckConfig::default()
        .merged(overrides)
        .context("merge check configuration")
}

/// Runs every enabled rule over the mesh at `settings.mesh_path`.
///
/// A failing error-tier rule is not an `Err`: the report carries `ok =
/// false` and the caller decides what that means.
pub fn run_checks(settings: &CheckSettings, source: &dyn MeshSource) -> Result<CheckReport, ToolError> {
    let config = check_config(&settings.overrides)?;
    let loaded = source.read_mesh(&settings.mesh_path)?;
    let checker = Checker::new().context("build rule registry")?;

    let report = checker.run(settings.mesh_path.as_str(), &loaded.mesh, &config);
    info!(
        mesh = %settings.mesh_path,
        ok = report.ok,
        rules = report.rules.len(),
        "checks finished"
    );
    Ok(report)
}

/// Writes the check report as pretty JSON to `out_path`.
pub fn write_check_artifacts(
    report: &CheckReport,
    out_path: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    if let Some(parent) = out_path.parent().filter(|p| !p.as_str().is_empty()) {
        writer.create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(report).context("serialize check report")?;
    json.push('\n');
    writer.write_file(out_path, json.as_bytes())
}

/// Where the audit log for a mesh written to `out_path` goes.
pub fn repair_log_path(out_path: &Utf8Path) -> Utf8PathBuf {
    out_path.with_extension("repair.json")
}

/// Where the original mesh is copied before an in-place write.
pub fn backup_path(mesh_path: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{}.meshfix.bak", mesh_path))
}

/// Lexical normal form: `.` segments dropped and `..` folded into a preceding
/// named segment. Symlinks are not resolved.
fn normalize_path(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for comp in path.components() {
        match comp {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match out.components().next_back() {
                Some(Utf8Component::Normal(_)) => {
                    out.pop();
                }
                Some(Utf8Component::RootDir | Utf8Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_str()),
        }
    }
    out
}

/// The two paths name the same file once normalized.
fn same_file(a: &Utf8Path, b: &Utf8Path) -> bool {
    normalize_path(a) == normalize_path(b)
}

struct FixTally {
    applied: Vec<FixEntry>,
    skipped: Vec<SkippedEntry>,
    waived: Vec<FixEntry>,
}

fn skip(rule: &str, reason: &str) -> SkippedEntry {
    SkippedEntry {
        rule: rule.to_string(),
        reason: reason.to_string(),
    }
}

fn apply_fixers(
    mesh: &mut MeshData,
    settings: &RepairSettings,
    plan: &RepairPlan,
) -> Result<FixTally, ToolError> {
    let mut tally = FixTally {
        applied: Vec::new(),
        skipped: Vec::new(),
        waived: Vec::new(),
    };

    for fixer in builtin_fixers() {
        let rule = fixer.rule_id();
        let policy = plan.rule(rule).cloned().unwrap_or_else(RulePolicy::default);
        if policy.is_disabled() {
            tally.skipped.push(skip(rule, "disabled by plan"));
            continue;
        }
        let Some(finding) = settings.findings.get(rule) else {
            tally.skipped.push(skip(rule, "no finding for rule"));
            continue;
        };

        let result = fixer.fix(mesh, finding, &policy)?;
        debug!(
            rule,
            applied = result.applied,
            waived = result.waived,
            "fixer finished"
        );
        let entry = |count| FixEntry {
            rule: rule.to_string(),
            count,
            notes: vec![result.notes.clone()],
        };
        if result.applied > 0 {
            tally.applied.push(entry(result.applied));
        } else if result.waived > 0 {
            tally.waived.push(entry(result.waived));
        } else {
            tally.skipped.push(skip(rule, "no-op"));
        }
    }
    Ok(tally)
}

fn verify(mesh_path: &Utf8Path, mesh: &MeshData, overrides: &Value) -> Result<VerifySummary, ToolError> {
    let config = check_config(overrides)?;
    let report = Checker::new()
        .context("build rule registry")?
        .run(mesh_path.as_str(), mesh, &config);
    Ok(VerifySummary {
        ok: report.ok,
        failing: report.failing_rules(),
    })
}

/// Applies the built-in fixers, in order, for the findings in `settings`.
///
/// Dry runs edit in memory only and return the input path with no log.
/// Otherwise the mesh goes to the output path through `writer`, which must
/// be present, followed by the audit log.
pub fn run_repair(
    settings: &RepairSettings,
    source: &dyn MeshSource,
    writer: Option<&dyn WritePort>,
    tool: ToolInfo,
) -> Result<RepairOutcome, ToolError> {
    let plan = RepairPlan::default()
        .merged(&settings.plan_overrides)
        .context("merge repair plan")?;
    let loaded = source.read_mesh(&settings.mesh_path)?;
    let mut mesh = loaded.mesh;

    let tally = apply_fixers(&mut mesh, settings, &plan)?;

    if settings.dry_run {
        info!(mesh = %settings.mesh_path, applied = tally.applied.len(), "dry run finished");
        return Ok(RepairOutcome {
            ok: true,
            msh_path: settings.mesh_path.to_string(),
            applied: tally.applied,
            skipped: tally.skipped,
            waived: tally.waived,
            log: None,
            verified: None,
        });
    }

    let writer = writer.ok_or(RepairError::WriterUnavailable)?;
    let out_path = settings.output_path();

    if same_file(&out_path, &settings.mesh_path) && plan.keep_backup {
        let backup = backup_path(&settings.mesh_path);
        writer
            .write_file(&backup, &loaded.bytes)
            .with_context(|| format!("back up {}", settings.mesh_path))?;
        debug!(backup = %backup, "original mesh backed up");
    }

    let rendered = render_mesh(&mesh).context("render repaired mesh")?;
    writer.write_file(&out_path, rendered.as_bytes())?;

    let mut log = RepairLog::new(tool, Utc::now().to_rfc3339(), plan.clone());
    log.input_sha256 = Some(sha256_hex(&loaded.bytes));
    log.applied = tally.applied.clone();
    log.skipped = tally.skipped.clone();
    log.waived = tally.waived.clone();

    let log_path = repair_log_path(&out_path);
    let mut log_json = serde_json::to_string_pretty(&log).context("serialize repair log")?;
    log_json.push('\n');
    writer.write_file(&log_path, log_json.as_bytes())?;

    let verified = if plan.verify {
        Some(verify(&out_path, &mesh, &settings.check_overrides)?)
    } else {
        None
    };

    info!(
        mesh = %out_path,
        log = %log_path,
        applied = tally.applied.len(),
        "repair written"
    );

    Ok(RepairOutcome {
        ok: verified.as_ref().is_none_or(|v| v.ok),
        msh_path: out_path.to_string(),
        applied: tally.applied,
        skipped: tally.skipped,
        waived: tally.waived,
        log: Some(log_path.to_string()),
        verified,
    })
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
