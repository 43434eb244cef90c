//! Fuzz target: result-channel parser.
//!
//! The child's stderr stream is attacker-influenced (scripts can print to
//! stderr before the wrapper writes its markers); the parser must never
//! panic regardless of input.
#![no_main]

use libfuzzer_sys::fuzz_target;

use crucible_engine::bootstrap::parse_result_channel;

fuzz_target!(|data: &[u8]| {
    let stderr = String::from_utf8_lossy(data);
    let _ = parse_result_channel(&stderr);
});
