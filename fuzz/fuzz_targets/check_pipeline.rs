#![no_main]

//! Fuzz target for check -> repair -> check on structured meshes.
//!
//! Node indices are folded into range so every generated mesh is loadable;
//! degenerate, duplicated and inverted cells are all fair game.

use libfuzzer_sys::fuzz_target;
use meshfix_checks::{CheckConfig, Checker};
use meshfix_mesh::MeshData;
use meshfix_repair::builtin_fixers;
use meshfix_types::RulePolicy;

#[derive(Debug, arbitrary::Arbitrary)]
struct MeshInput {
    /// Lattice coordinates keep the geometry finite.
    points: Vec<(i8, i8)>,
    tris: Vec<[u8; 3]>,
    quads: Vec<[u8; 4]>,
    enable_overlaps: bool,
}

fuzz_target!(|input: MeshInput| {
    if input.points.is_empty() || input.points.len() > 64 {
        return;
    }
    let n = input.points.len();
    let points = input
        .points
        .iter()
        .map(|&(x, y)| [f64::from(x), f64::from(y)])
        .collect();
    let tris = input
        .tris
        .iter()
        .take(64)
        .map(|t| t.map(|i| usize::from(i) % n))
        .collect();
    let quads = input
        .quads
        .iter()
        .take(64)
        .map(|q| q.map(|i| usize::from(i) % n))
        .collect();
    let mut mesh = MeshData::from_parts(points, tris, quads);

    let mut config = CheckConfig::default();
    config
        .enabled
        .insert("overlapping_elements".to_string(), input.enable_overlaps);

    let Ok(checker) = Checker::new() else {
        return;
    };
    let report = checker.run("fuzz.json", &mesh, &config);
    assert_eq!(report.ok, report.failing_rules().is_empty());

    for fixer in builtin_fixers() {
        let Some(finding) = report.rules.get(fixer.rule_id()) else {
            continue;
        };
        let _ = fixer.fix(&mut mesh, finding, &RulePolicy::default());
    }

    let _ = checker.run("fuzz.json", &mesh, &config);
});
