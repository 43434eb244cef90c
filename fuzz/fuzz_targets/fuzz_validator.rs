//! Fuzz target: static script validation.
//!
//! Arbitrary byte sequences fed through the validator must always terminate
//! with a verdict — never a panic — and must never execute anything.
#![no_main]

use libfuzzer_sys::fuzz_target;

use crucible_core::{SandboxConfig, Script};
use crucible_engine::validate;

fuzz_target!(|data: &[u8]| {
    let source = String::from_utf8_lossy(data);
    let config = SandboxConfig::default();
    let _ = validate(&Script::new(source.into_owned()), &config);
});
