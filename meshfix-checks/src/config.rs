use crate::registry::RULES_ORDER;
use meshfix_types::deep_merge;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Rules that only make sense with extra input, off unless asked for.
const DISABLED_BY_DEFAULT: &[&str] = &["overlapping_elements", "first_layer_height"];

/// Tunables read by the rules. Unknown keys are ignored when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub min_angle_deg: f64,
    /// Fraction of 90 degrees.
    pub quad_skew_p95: f64,
    pub grading_ratio_max: f64,
    /// Relative to the mean cell area.
    pub tiny_area_rel: f64,
    pub tiny_area_abs: f64,
    pub collinear_eps: f64,
    pub overlap_grid_bins: usize,
    pub wall_name: String,
    pub first_layer_target: Option<f64>,
    pub required_groups: Vec<String>,
    pub group_dims: Option<BTreeMap<String, u8>>,
    pub strict_if_no_field_data: bool,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_angle_deg: 20.0,
            quad_skew_p95: 0.85,
            grading_ratio_max: 2.5,
            tiny_area_rel: 1e-3,
            tiny_area_abs: 0.0,
            collinear_eps: 1e-12,
            overlap_grid_bins: 96,
            wall_name: "airfoil".to_string(),
            first_layer_target: None,
            required_groups: ["inlet", "outlet", "top", "bottom", "airfoil", "fluid"]
                .into_iter()
                .map(String::from)
                .collect(),
            group_dims: None,
            strict_if_no_field_data: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid check configuration: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Effective configuration for one validation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Rule id to on/off. Absent ids count as enabled; unknown ids are kept
    /// but never run.
    #[serde(default)]
    pub enabled: BTreeMap<String, bool>,

    #[serde(default)]
    pub thresholds: Thresholds,
}

impl Default for CheckConfig {
    fn default() -> Self {
        let enabled = RULES_ORDER
            .iter()
            .map(|id| (id.to_string(), !DISABLED_BY_DEFAULT.contains(id)))
            .collect();
        Self {
            enabled,
            thresholds: Thresholds::default(),
        }
    }
}

impl CheckConfig {
    /// Deep-merge user JSON (`{"enabled": {...}, "thresholds": {...}}`, any
    /// subset) over this configuration.
    pub fn merged(&self, overrides: &Value) -> Result<CheckConfig, ConfigError> {
        let base = serde_json::to_value(self)?;
        Ok(serde_json::from_value(deep_merge(&base, overrides))?)
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.enabled.get(id).copied().unwrap_or(true)
    }
}
