//! Fuzz target: JSON value predicate.
//!
//! Any value `serde_json` can parse must pass through the predicate without
//! panicking or recursing unboundedly.
#![no_main]

use libfuzzer_sys::fuzz_target;

use crucible_core::ensure_json_value;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = ensure_json_value(&value);
    }
});
