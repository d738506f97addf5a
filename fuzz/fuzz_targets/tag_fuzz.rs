#![no_main]

use libfuzzer_sys::fuzz_target;

#[path = "common.rs"]
mod common;

fuzz_target!(|data: &[u8]| {
    if let Ok(project_text) = std::str::from_utf8(data) {
        // Format: 0900{FUZZED_PROJECT_TEXT} - exercises alias/duration-rule
        // resolution and the "neither alias nor keyword" validation issue.
        let content = format!("2020-01-01\n0900{project_text}");
        common::run_validate_structure(&content);
    }
});
