//! Right-biased deep merge over JSON values.

use serde_json::Value;

/// Merge `overrides` onto `base` without mutating either.
///
/// Objects merge key by key, recursively. Any other override value replaces
/// the base value wholesale. `null` means "no override" and keeps the base.
pub fn deep_merge(base: &Value, overrides: &Value) -> Value {
    match (base, overrides) {
        (_, Value::Null) => base.clone(),
        (Value::Object(b), Value::Object(o)) => {
            let mut out = b.clone();
            for (key, value) in o {
                let merged = match out.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                out.insert(key.clone(), merged);
            }
            Value::Object(out)
        }
        (_, other) => other.clone(),
    }
}
