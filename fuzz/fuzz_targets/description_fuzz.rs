#![no_main]

use libfuzzer_sys::fuzz_target;

#[path = "common.rs"]
mod common;

fuzz_target!(|data: &[u8]| {
    if let Ok(remark) = std::str::from_utf8(data) {
        // Format: 0900work // {FUZZED_REMARK}
        let content = format!("2020-01-01\n0900work // {remark}");
        common::run_validate_structure(&content);
    }
});
