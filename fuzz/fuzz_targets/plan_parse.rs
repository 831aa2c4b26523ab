#![no_main]

//! Fuzz target for repair plan, findings and check config parsing.

use libfuzzer_sys::fuzz_target;
use meshfix_types::{RepairPlan, RuleFindings};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    let _ = serde_json::from_str::<RuleFindings>(s);
    let _ = serde_json::from_str::<meshfix_types::CheckReport>(s);

    if let Ok(val) = serde_json::from_str::<serde_json::Value>(s) {
        if let Ok(plan) = RepairPlan::default().merged(&val) {
            let _ = serde_json::to_string(&plan);
        }
        let _ = meshfix_checks::CheckConfig::default().merged(&val);
    }
});
