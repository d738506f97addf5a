#![no_main]

use libfuzzer_sys::fuzz_target;

#[path = "common.rs"]
mod common;

fuzz_target!(|data: &[u8]| {
    if let Ok(fuzzed_prefix) = std::str::from_utf8(data) {
        // Drives the HHMM time-prefix parser directly with arbitrary bytes
        // in place of a well-formed four-digit clock time.
        let prefix: String = fuzzed_prefix.chars().take(8).collect();
        let content = format!("2020-01-01\n{prefix}work\n");
        common::run_validate_structure(&content);
    }
});
