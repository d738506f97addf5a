//! Shared harness for the fuzz targets: builds a minimal bundle in a fresh
//! temp dir, drops `content` in as a single source day-log file, and runs
//! `tt validate-structure` against it. Never asserts on the outcome - a
//! validation failure is an expected, reported result; a panic or hang in
//! the process is what the fuzzer is looking for.

use assert_cmd::Command;
use assert_fs::prelude::*;

const BUNDLE_TOML: &str = r#"
schema_version = 1
profile = "fuzz"
[file_list]
required = []
optional = []
[paths.converter]
interval_config = "meta/interval.toml"
[paths.visualization]
heatmap = "meta/heatmap.toml"
[paths.reports.markdown]
[paths.reports.latex]
[paths.reports.typst]
"#;

const INTERVAL_TOML: &str = r#"
wake_keywords = ["起床"]
day_remark_prefix = "@"
remark_prefixes = ["//"]
[aliases]
work = "work"
meal = "meal"
sleep = "sleep"
[duration_rules]
toilet = 600
"#;

const HEATMAP_TOML: &str = r#"
[thresholds]
positive_hours = [1.0]
[palettes]
default = ["#000000", "#ffffff"]
[defaults]
light_palette = "default"
dark_palette = "default"
"#;

pub fn run_validate_structure(content: &str) {
    let Ok(root) = assert_fs::TempDir::new() else { return };
    let _ = std::fs::create_dir_all(root.path().join("meta"));
    let _ = std::fs::create_dir_all(root.path().join("input"));
    if root.child("meta/bundle.toml").write_str(BUNDLE_TOML).is_err() {
        return;
    }
    if root.child("meta/interval.toml").write_str(INTERVAL_TOML).is_err() {
        return;
    }
    if root.child("meta/heatmap.toml").write_str(HEATMAP_TOML).is_err() {
        return;
    }
    if root.child("input/fuzz.txt").write_str(content).is_err() {
        return;
    }

    if let Ok(mut cmd) = Command::cargo_bin("tt") {
        cmd.env("TT_BUNDLE_ROOT", root.path())
            .env("TT_DB_PATH", root.path().join("fuzz.sqlite3"))
            .env("TT_STATS_DIR", root.path().join("stats"))
            .arg("validate-structure")
            .arg("--input")
            .arg(root.path().join("input"));
        let _ = cmd.output();
    }
}
