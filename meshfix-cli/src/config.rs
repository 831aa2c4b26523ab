//! Configuration file loading for meshfix.
//!
//! Discovers and loads `meshfix.toml` from the project root and merges it
//! with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use meshfix_types::deep_merge;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "meshfix.toml";

/// Top-level configuration from meshfix.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MeshfixConfig {
    /// Rule id to on/off.
    pub enabled: BTreeMap<String, bool>,

    /// Threshold overrides, keyed like the library's `Thresholds`.
    pub thresholds: toml::Table,

    /// Repair plan overrides (`verify`, `keep_backup`, `[repair.rules.<id>]`).
    pub repair: toml::Table,
}

/// Discover the meshfix.toml config file in `root`.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!(path = %config_path, "found config file");
        Some(config_path)
    } else {
        debug!(path = %config_path, "no config file");
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<MeshfixConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<MeshfixConfig> {
    let config: MeshfixConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from `root`, or return the default if there is none.
pub fn load_or_default(root: &Utf8Path) -> anyhow::Result<MeshfixConfig> {
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(MeshfixConfig::default()),
    }
}

/// Reads a JSON object from disk, e.g. `--config` or `--plan`.
pub fn load_json(path: &Utf8Path) -> anyhow::Result<Value> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path))?;
    let value: Value =
        serde_json::from_str(&contents).with_context(|| format!("parse JSON {}", path))?;
    if !value.is_object() {
        anyhow::bail!("{} must contain a JSON object", path);
    }
    Ok(value)
}

/// Overrides handed to the core pipelines, as JSON deep-merged over the
/// library defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedConfig {
    /// `{"enabled": {...}, "thresholds": {...}}`
    pub check_overrides: Value,

    /// Repair plan overrides.
    pub plan_overrides: Value,
}

/// CLI-side check flags.
#[derive(Debug, Clone, Default)]
pub struct CheckFlags {
    /// Contents of `--config FILE.json`.
    pub config_json: Option<Value>,
    pub enable: Vec<String>,
    pub disable: Vec<String>,
    pub thresholds: BTreeMap<String, Value>,
}

/// Builder for merging the config file with CLI arguments.
pub struct ConfigMerger {
    config: MeshfixConfig,
}

impl ConfigMerger {
    pub fn new(config: MeshfixConfig) -> Self {
        Self { config }
    }

    fn file_check_overrides(&self) -> anyhow::Result<Value> {
        let thresholds =
            serde_json::to_value(&self.config.thresholds).context("convert [thresholds]")?;
        Ok(json!({
            "enabled": self.config.enabled,
            "thresholds": thresholds,
        }))
    }

    fn file_plan_overrides(&self) -> anyhow::Result<Value> {
        serde_json::to_value(&self.config.repair).context("convert [repair]")
    }

    /// Layers, lowest first: meshfix.toml, `--config`, then `--enable`,
    /// `--disable` and `--threshold`. A rule named by both `--enable` and
    /// `--disable` ends up disabled.
    pub fn merge_check_args(self, flags: &CheckFlags) -> anyhow::Result<MergedConfig> {
        let mut check = self.file_check_overrides()?;
        if let Some(file) = &flags.config_json {
            check = deep_merge(&check, file);
        }

        let mut enabled = Map::new();
        for id in &flags.enable {
            enabled.insert(id.clone(), Value::Bool(true));
        }
        for id in &flags.disable {
            enabled.insert(id.clone(), Value::Bool(false));
        }
        let thresholds: Map<String, Value> = flags
            .thresholds
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        check = deep_merge(
            &check,
            &json!({"enabled": enabled, "thresholds": thresholds}),
        );

        Ok(MergedConfig {
            check_overrides: check,
            plan_overrides: self.file_plan_overrides()?,
        })
    }

    /// The `[repair]` table, with `--plan FILE.json` merged on top.
    pub fn merge_repair_args(self, plan_json: Option<&Value>) -> anyhow::Result<MergedConfig> {
        let mut plan = self.file_plan_overrides()?;
        if let Some(file) = plan_json {
            plan = deep_merge(&plan, file);
        }
        Ok(MergedConfig {
            check_overrides: self.file_check_overrides()?,
            plan_overrides: plan,
        })
    }
}

/// Parse `key=value` threshold flags. Values are read as JSON when they
/// parse (numbers, booleans, arrays) and as plain strings otherwise.
pub fn parse_threshold_args(entries: &[String]) -> anyhow::Result<BTreeMap<String, Value>> {
    let mut out = BTreeMap::new();
    for entry in entries {
        let mut parts = entry.splitn(2, '=');
        let key = parts
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("invalid threshold '{}': missing key", entry))?;
        let raw = parts
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("invalid threshold '{}': missing value", entry))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        out.insert(key.to_string(), value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const EXAMPLE: &str = r#"
[enabled]
overlapping_elements = true
untagged_entities = false

[thresholds]
min_angle_deg = 25.0
wall_name = "wing"
required_groups = ["inlet", "outlet", "wing"]

[repair]
verify = true

[repair.rules.duplicate_elements]
prefer = "last"
"#;

    #[test]
    fn parses_example_config() {
        let config = parse_config(EXAMPLE).unwrap();
        assert_eq!(config.enabled.get("overlapping_elements"), Some(&true));
        assert_eq!(config.enabled.get("untagged_entities"), Some(&false));
        assert_eq!(
            config.thresholds.get("wall_name").and_then(|v| v.as_str()),
            Some("wing")
        );
        assert_eq!(config.repair.get("verify").and_then(|v| v.as_bool()), Some(true));
    }

    #[test]
    fn empty_config_has_no_overrides() {
        let config = parse_config("").unwrap();
        assert!(config.enabled.is_empty());
        assert!(config.thresholds.is_empty());
        assert!(config.repair.is_empty());
    }

    #[test]
    fn unknown_section_type_is_an_error() {
        let err = parse_config("enabled = 3").unwrap_err();
        assert!(err.to_string().contains("invalid TOML"));
    }

    #[test]
    fn file_values_survive_without_flags() {
        let config = parse_config(EXAMPLE).unwrap();
        let merged = ConfigMerger::new(config)
            .merge_check_args(&CheckFlags::default())
            .unwrap();
        assert_eq!(merged.check_overrides["thresholds"]["min_angle_deg"], json!(25.0));
        assert_eq!(merged.check_overrides["enabled"]["untagged_entities"], json!(false));
        assert_eq!(
            merged.plan_overrides["rules"]["duplicate_elements"]["prefer"],
            json!("last")
        );
    }

    #[test]
    fn flags_override_json_which_overrides_file() {
        let config = parse_config(EXAMPLE).unwrap();
        let json_file = json!({"thresholds": {"min_angle_deg": 30.0, "grading_ratio_max": 3.0}});
        let merged = ConfigMerger::new(config)
            .merge_check_args(&CheckFlags {
                config_json: Some(json_file),
                enable: vec!["untagged_entities".to_string()],
                disable: vec!["tiny_elements".to_string(), "overlapping_elements".to_string()],
                thresholds: parse_threshold_args(&["min_angle_deg=35".to_string()]).unwrap(),
            })
            .unwrap();

        let check = &merged.check_overrides;
        assert_eq!(check["thresholds"]["min_angle_deg"], json!(35));
        assert_eq!(check["thresholds"]["grading_ratio_max"], json!(3.0));
        assert_eq!(check["thresholds"]["wall_name"], json!("wing"));
        assert_eq!(check["enabled"]["untagged_entities"], json!(true));
        assert_eq!(check["enabled"]["overlapping_elements"], json!(false));
        assert_eq!(check["enabled"]["tiny_elements"], json!(false));
    }

    #[test]
    fn merged_overrides_feed_the_check_config() {
        let merged = ConfigMerger::new(MeshfixConfig::default())
            .merge_check_args(&CheckFlags {
                thresholds: parse_threshold_args(&["wall_name=wing".to_string()]).unwrap(),
                ..Default::default()
            })
            .unwrap();
        let config = meshfix_checks::CheckConfig::default()
            .merged(&merged.check_overrides)
            .unwrap();
        assert_eq!(config.thresholds.wall_name, "wing");
        assert_eq!(config.enabled.get("overlapping_elements"), Some(&false));
    }

    #[test]
    fn plan_file_overrides_repair_table() {
        let config = parse_config(EXAMPLE).unwrap();
        let plan = json!({"verify": false, "rules": {"multiple_edges": {"action": "skip"}}});
        let merged = ConfigMerger::new(config).merge_repair_args(Some(&plan)).unwrap();
        assert_eq!(merged.plan_overrides["verify"], json!(false));
        assert_eq!(
            merged.plan_overrides["rules"]["duplicate_elements"]["prefer"],
            json!("last")
        );
        assert_eq!(
            merged.plan_overrides["rules"]["multiple_edges"]["action"],
            json!("skip")
        );
    }

    #[test]
    fn threshold_values_are_typed() {
        let parsed = parse_threshold_args(&[
            "min_angle_deg=12.5".to_string(),
            "strict_if_no_field_data=true".to_string(),
            "required_groups=[\"a\",\"b\"]".to_string(),
            "wall_name=wing".to_string(),
        ])
        .unwrap();
        assert_eq!(parsed["min_angle_deg"], json!(12.5));
        assert_eq!(parsed["strict_if_no_field_data"], json!(true));
        assert_eq!(parsed["required_groups"], json!(["a", "b"]));
        assert_eq!(parsed["wall_name"], json!("wing"));
    }

    #[test]
    fn threshold_missing_parts_are_rejected() {
        let err = parse_threshold_args(&["=1".to_string()]).unwrap_err();
        assert!(err.to_string().contains("missing key"));
        let err = parse_threshold_args(&["min_angle_deg=".to_string()]).unwrap_err();
        assert!(err.to_string().contains("missing value"));
    }

    #[test]
    fn json_files_must_be_objects() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let path = root.join("plan.json");
        std::fs::write(&path, "[1, 2]").expect("write");
        assert!(load_json(&path).is_err());
        std::fs::write(&path, r#"{"verify": true}"#).expect("write");
        assert_eq!(load_json(&path).unwrap(), json!({"verify": true}));
    }

    #[test]
    fn load_or_default_without_file() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        assert!(discover_config(&root).is_none());
        let cfg = load_or_default(&root).expect("load default");
        assert!(cfg.enabled.is_empty());

        std::fs::write(root.join(CONFIG_FILE_NAME), EXAMPLE).expect("write config");
        assert!(discover_config(&root).is_some());
        assert_eq!(load_or_default(&root).unwrap().enabled.len(), 2);
    }
}
