use anyhow::Context;
use clap::{Parser, Subcommand};
use fs_err as fs;
use meshfix_checks::CheckConfig;
use meshfix_types::RepairPlan;
use std::path::Path;
use std::process::Command as ProcessCommand;

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Workspace helper tasks")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print schema identifiers used by meshfix.
    PrintSchemas,
    /// Write a meshfix.toml with every default spelled out.
    InitConfig {
        #[arg(long, default_value = ".")]
        dir: String,
        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Bless golden fixtures (overwrite expected outputs).
    BlessFixtures,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::PrintSchemas => {
            println!("{}", meshfix_types::schema::MESHFIX_MESH_V1);
            println!("{}", meshfix_types::schema::MESHFIX_REPAIR_LOG_V1);
        }
        Command::InitConfig { dir, force } => {
            let path = init_config(Path::new(&dir), force)?;
            println!("wrote {}", path.display());
        }
        Command::BlessFixtures => {
            let status = ProcessCommand::new("cargo")
                .args(["test", "-p", "meshfix-core", "--test", "golden_fixtures"])
                .env("MESHFIX_BLESS", "1")
                .status()
                .context("run golden fixture blessing")?;
            if !status.success() {
                anyhow::bail!("bless-fixtures failed");
            }
        }
    }
    Ok(())
}

/// The default check configuration and repair plan as meshfix.toml text.
fn default_config_toml() -> anyhow::Result<String> {
    let check = CheckConfig::default();
    let mut doc = toml::Table::new();
    doc.insert(
        "enabled".to_string(),
        toml::Value::try_from(&check.enabled).context("encode [enabled]")?,
    );
    doc.insert(
        "thresholds".to_string(),
        toml::Value::try_from(&check.thresholds).context("encode [thresholds]")?,
    );
    doc.insert(
        "repair".to_string(),
        toml::Value::try_from(RepairPlan::default()).context("encode [repair]")?,
    );
    toml::to_string_pretty(&doc).context("render meshfix.toml")
}

fn init_config(dir: &Path, force: bool) -> anyhow::Result<std::path::PathBuf> {
    let path = dir.join("meshfix.toml");
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    fs::write(&path, default_config_toml()?)?;
    Ok(path)
}
