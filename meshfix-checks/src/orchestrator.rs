use crate::cache::MeshCache;
use crate::config::{CheckConfig, ConfigError};
use crate::registry::{RegistryError, RuleRegistry, builtin_registry, get_enabled_ids};
use crate::view::MeshView;
use meshfix_mesh::MeshData;
use meshfix_types::{CheckMeta, CheckReport, RuleFindings};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Runs the enabled rules of a registry over one mesh.
#[derive(Debug, Clone)]
pub struct Checker {
    registry: RuleRegistry,
}

impl Checker {
    pub fn new() -> Result<Self, RegistryError> {
        Ok(Self {
            registry: builtin_registry()?,
        })
    }

    pub fn with_registry(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Deep-merges `overrides` over the default configuration, then runs.
    pub fn run_with_overrides(
        &self,
        mesh_path: &str,
        mesh: &MeshData,
        overrides: &Value,
    ) -> Result<CheckReport, CheckError> {
        let config = CheckConfig::default().merged(overrides)?;
        Ok(self.run(mesh_path, mesh, &config))
    }

    pub fn run(&self, mesh_path: &str, mesh: &MeshData, config: &CheckConfig) -> CheckReport {
        let view = MeshView::new(mesh_path, mesh);
        let th = &config.thresholds;
        let grid_bins = config
            .is_enabled("overlapping_elements")
            .then_some(th.overlap_grid_bins);
        let cache = MeshCache::build(&view, grid_bins);

        let mut rules = RuleFindings::new();
        for id in get_enabled_ids(&config.enabled) {
            let Some(spec) = self.registry.get(id) else {
                warn!(rule = id, "enabled rule has no registry entry");
                continue;
            };
            let mut finding = (spec.check)(&view, th, &cache);
            finding.id = spec.id.clone();
            finding.severity = spec.severity;
            debug!(
                rule = id,
                ok = finding.ok,
                count = finding.count,
                "rule finished"
            );
            rules.push(finding);
        }

        let ok = !rules.iter().any(|f| f.is_blocking());
        CheckReport {
            ok,
            rules,
            meta: CheckMeta {
                mesh_path: mesh_path.to_string(),
                n_points: view.n_points(),
                n_tris: view.n_tris(),
                n_quads: view.n_quads(),
                thresholds: serde_json::to_value(th).unwrap_or_default(),
                enabled: config.enabled.clone(),
            },
        }
    }
}
