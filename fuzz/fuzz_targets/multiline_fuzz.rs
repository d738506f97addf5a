#![no_main]

use libfuzzer_sys::fuzz_target;

#[path = "common.rs"]
mod common;

fuzz_target!(|data: &[u8]| {
    if let Ok(fuzzed_content) = std::str::from_utf8(data) {
        let mut content = String::from("2020-01-01\n0600起床\n");
        for (i, line) in fuzzed_content.lines().take(20).enumerate() {
            // Alternate event lines and `@`-prefixed day remarks so the
            // fuzzer can exercise both parse paths within one block.
            if i % 5 == 0 {
                content.push_str("@ ");
                content.push_str(line);
                content.push('\n');
            } else {
                content.push_str("0700work // ");
                content.push_str(line);
                content.push('\n');
            }
        }
        common::run_validate_structure(&content);
    }
});
