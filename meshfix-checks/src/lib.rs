//! Mesh validation: turn a mesh snapshot into one finding per enabled rule.
//!
//! This crate owns *what* is wrong with a mesh and how bad it is. It never
//! edits connectivity; that's the `meshfix-repair` crate.
//!
//! A pass is: build a [`MeshView`] and its [`MeshCache`] once, then run every
//! enabled rule from the [`RuleRegistry`] in [`RULES_ORDER`]. Rules are pure
//! functions over borrowed, read-only inputs.

mod cache;
mod config;
mod grid;
mod orchestrator;
mod registry;
mod rules;
mod stats;
mod view;

pub use cache::MeshCache;
pub use config::{CheckConfig, ConfigError, Thresholds};
pub use grid::SpatialGrid;
pub use orchestrator::{CheckError, Checker};
pub use registry::{
    CheckFn, RULES_ORDER, RegistryBuilder, RegistryError, RuleRegistry, RuleSpec,
    builtin_registry, get_enabled_ids,
};
pub use stats::percentile;
pub use view::MeshView;
