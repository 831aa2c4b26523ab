mod config;
mod explain;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::{CheckFlags, ConfigMerger};
use fs_err as fs;
use meshfix_checks::{CheckConfig, RULES_ORDER, builtin_registry};
use meshfix_core::{
    CheckSettings, FsMeshSource, FsWritePort, RepairSettings, ToolError, run_checks, run_repair,
    write_check_artifacts,
};
use meshfix_types::{CheckReport, RepairOutcome, RuleFindings, ToolInfo};
use serde_json::Value;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "meshfix",
    version,
    about = "Rule-based validation and repair for 2D surface meshes."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the enabled rules over a mesh and report per-rule findings.
    Check(CheckArgs),
    /// Apply the built-in fixers for a set of findings (default: dry-run).
    Repair(RepairArgs),
    /// List every rule with its severity and fixability.
    ListRules(ListRulesArgs),
    /// Explain what a rule checks and how to fix a failure.
    Explain(ExplainArgs),
}

#[derive(Debug, Parser)]
struct CheckArgs {
    /// Mesh document (JSON).
    mesh: Utf8PathBuf,

    /// Directory searched for meshfix.toml.
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// JSON file with `enabled` / `thresholds` overrides.
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Enable a rule (repeatable).
    #[arg(long)]
    enable: Vec<String>,

    /// Disable a rule (repeatable). Wins over --enable.
    #[arg(long)]
    disable: Vec<String>,

    /// Threshold override as key=value (repeatable).
    #[arg(long = "threshold")]
    thresholds: Vec<String>,

    /// Write the full JSON report here.
    #[arg(long)]
    out: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct RepairArgs {
    /// Mesh document (JSON).
    mesh: Utf8PathBuf,

    /// Findings to act on: a check report or a bare rule-id map.
    #[arg(long)]
    findings: Utf8PathBuf,

    /// JSON repair plan, merged over meshfix.toml's [repair] table.
    #[arg(long)]
    plan: Option<Utf8PathBuf>,

    /// Directory searched for meshfix.toml.
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// Write the repaired mesh. Without this, nothing touches disk.
    #[arg(long, default_value_t = false)]
    apply: bool,

    /// Destination of the repaired mesh (default: overwrite the input).
    #[arg(long)]
    out: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct ListRulesArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct ExplainArgs {
    /// Rule id to explain (e.g., "surface_orientation").
    rule: String,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(exit_code = e.exit_code(), "{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn real_main() -> Result<(), ToolError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Repair(args) => cmd_repair(args),
        Command::ListRules(args) => Ok(cmd_list_rules(args)?),
        Command::Explain(args) => Ok(cmd_explain(args)?),
    }
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "meshfix".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

fn cmd_check(args: CheckArgs) -> Result<(), ToolError> {
    let file_config = config::load_or_default(&args.root).context("load meshfix.toml config")?;
    let flags = CheckFlags {
        config_json: args.config.as_deref().map(config::load_json).transpose()?,
        enable: args.enable,
        disable: args.disable,
        thresholds: config::parse_threshold_args(&args.thresholds)?,
    };
    let merged = ConfigMerger::new(file_config).merge_check_args(&flags)?;
    debug!(overrides = %merged.check_overrides, "merged check config");

    let mut settings = CheckSettings::new(args.mesh);
    settings.overrides = merged.check_overrides;
    let report = run_checks(&settings, &FsMeshSource)?;

    print_report(&report);
    if let Some(out) = &args.out {
        write_check_artifacts(&report, out, &FsWritePort)?;
        info!(out = %out, "wrote check report");
    }

    if report.ok {
        Ok(())
    } else {
        Err(ToolError::ValidationFailed {
            failing: report.failing_rules(),
        })
    }
}

fn print_report(report: &CheckReport) {
    println!(
        "{}: {} points, {} triangles, {} quads",
        report.meta.mesh_path, report.meta.n_points, report.meta.n_tris, report.meta.n_quads
    );
    println!();
    println!("  {:<28} {:<6} {:<6} COUNT", "RULE", "LEVEL", "STATUS");
    println!("  {:<28} {:<6} {:<6} -----", "----", "-----", "------");
    for finding in &report.rules {
        let status = if finding.is_skipped() {
            "skip"
        } else if finding.ok {
            "pass"
        } else {
            "FAIL"
        };
        println!(
            "  {:<28} {:<6} {:<6} {}",
            finding.id, finding.severity, status, finding.count
        );
    }
    println!();
    println!("overall: {}", if report.ok { "ok" } else { "FAILED" });
}

/// Accepts a whole check report (`{"ok": .., "rules": {..}}`) or just its
/// `rules` map.
fn load_findings(path: &Utf8Path) -> anyhow::Result<RuleFindings> {
    let text = fs::read_to_string(path).with_context(|| format!("read findings {}", path))?;
    let value: Value =
        serde_json::from_str(&text).with_context(|| format!("parse findings {}", path))?;
    let rules = match value.get("rules") {
        Some(rules) if rules.is_object() => rules.clone(),
        _ => value,
    };
    serde_json::from_value(rules).with_context(|| format!("decode findings {}", path))
}

fn cmd_repair(args: RepairArgs) -> Result<(), ToolError> {
    let file_config = config::load_or_default(&args.root).context("load meshfix.toml config")?;
    let plan_json = args.plan.as_deref().map(config::load_json).transpose()?;
    let merged = ConfigMerger::new(file_config).merge_repair_args(plan_json.as_ref())?;
    debug!(plan = %merged.plan_overrides, "merged repair plan");

    let mut settings = RepairSettings::new(args.mesh, load_findings(&args.findings)?);
    settings.plan_overrides = merged.plan_overrides;
    settings.check_overrides = merged.check_overrides;
    settings.dry_run = !args.apply;
    settings.out_path = args.out;

    let outcome = run_repair(&settings, &FsMeshSource, Some(&FsWritePort), tool_info())?;
    print_outcome(&outcome, settings.dry_run);

    match &outcome.verified {
        Some(v) if !v.ok => Err(ToolError::ValidationFailed {
            failing: v.failing.clone(),
        }),
        _ => Ok(()),
    }
}

fn print_outcome(outcome: &RepairOutcome, dry_run: bool) {
    if dry_run {
        println!("dry-run: {} (nothing written)", outcome.msh_path);
    } else {
        println!("wrote {}", outcome.msh_path);
        if let Some(log) = &outcome.log {
            println!("log   {}", log);
        }
    }
    for entry in &outcome.applied {
        println!("  applied  {:<28} {:>5}  {}", entry.rule, entry.count, entry.notes.join("; "));
    }
    for entry in &outcome.waived {
        println!("  waived   {:<28} {:>5}  {}", entry.rule, entry.count, entry.notes.join("; "));
    }
    for entry in &outcome.skipped {
        println!("  skipped  {:<28}        {}", entry.rule, entry.reason);
    }
    if let Some(v) = &outcome.verified {
        if v.ok {
            println!("verify: ok");
        } else {
            println!("verify: FAILED ({})", v.failing.join(", "));
        }
    }
}

fn cmd_explain(args: ExplainArgs) -> anyhow::Result<()> {
    use explain::{list_rule_ids, lookup_rule};

    let Some(rule) = lookup_rule(&args.rule) else {
        anyhow::bail!(
            "Unknown rule: '{}'\n\nAvailable rules: {}",
            args.rule,
            list_rule_ids().join(", ")
        );
    };
    let registry = builtin_registry().context("build rule registry")?;
    let spec = registry
        .get(rule.id)
        .with_context(|| format!("rule {} has no registry entry", rule.id))?;
    let enabled = CheckConfig::default()
        .enabled
        .get(rule.id)
        .copied()
        .unwrap_or(true);

    println!("================================================================================");
    println!("RULE: {}", rule.title);
    println!("================================================================================");
    println!();
    println!("Id:        {}", rule.id);
    println!("Severity:  {}", spec.severity);
    println!("Fixable:   {}", if spec.fixable { "yes" } else { "no" });
    println!("Default:   {}", if enabled { "enabled" } else { "disabled" });
    println!();

    println!("DESCRIPTION");
    println!("--------------------------------------------------------------------------------");
    println!("{}", rule.description);
    println!();

    println!("METHOD");
    println!("--------------------------------------------------------------------------------");
    println!("{}", rule.method);
    println!();

    if let Some(fixer) = rule.fixer {
        println!("BUILT-IN FIXER");
        println!("--------------------------------------------------------------------------------");
        println!("{}", fixer);
        println!();
    }

    println!("REMEDIATION GUIDANCE");
    println!("--------------------------------------------------------------------------------");
    println!("{}", rule.remediation);
    println!();

    Ok(())
}

fn cmd_list_rules(args: ListRulesArgs) -> anyhow::Result<()> {
    let registry = builtin_registry().context("build rule registry")?;
    let defaults = CheckConfig::default();

    let rows: Vec<_> = RULES_ORDER
        .iter()
        .filter_map(|id| {
            let spec = registry.get(id)?;
            let title = explain::lookup_rule(id).map_or("", |r| r.title);
            let enabled = defaults.enabled.get(*id).copied().unwrap_or(true);
            Some((spec, title, enabled))
        })
        .collect();

    match args.format {
        OutputFormat::Text => {
            println!("Available rules:\n");
            println!("  {:<28} {:<6} {:<8} {:<9} TITLE", "ID", "LEVEL", "FIXABLE", "DEFAULT");
            println!("  {:<28} {:<6} {:<8} {:<9} -----", "--", "-----", "-------", "-------");
            for (spec, title, enabled) in &rows {
                println!(
                    "  {:<28} {:<6} {:<8} {:<9} {}",
                    spec.id,
                    spec.severity,
                    if spec.fixable { "yes" } else { "no" },
                    if *enabled { "on" } else { "off" },
                    title
                );
            }
            println!();
            println!("Use 'meshfix explain <rule>' for details.");
        }
        OutputFormat::Json => {
            let rules: Vec<_> = rows
                .iter()
                .map(|(spec, title, enabled)| {
                    serde_json::json!({
                        "id": spec.id,
                        "title": title,
                        "severity": spec.severity,
                        "fixable": spec.fixable,
                        "enabled_by_default": enabled,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rules).context("serialize rules")?);
        }
    }
    Ok(())
}
