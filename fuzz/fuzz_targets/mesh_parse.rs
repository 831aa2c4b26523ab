#![no_main]

//! Fuzz target for the JSON mesh loader.
//!
//! Anything `parse_mesh` accepts must be safe to check: indices are
//! validated at load time, so no rule may index out of bounds afterwards.

use libfuzzer_sys::fuzz_target;
use meshfix_checks::{CheckConfig, Checker};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mesh) = meshfix_mesh::parse_mesh(s) else {
        return;
    };

    let Ok(checker) = Checker::new() else {
        return;
    };
    let report = checker.run("fuzz.json", &mesh, &CheckConfig::default());
    let _ = serde_json::to_string(&report);

    // Whatever we render must load again.
    if let Ok(text) = meshfix_mesh::render_mesh(&mesh) {
        assert!(meshfix_mesh::parse_mesh(&text).is_ok());
    }
});
