#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]

use assert_cmd::Command;
use assert_fs::prelude::*;
use criterion::{measurement::WallTime, BatchSize, BenchmarkGroup, SamplingMode, Throughput};
use std::time::Duration;

/// DSL for creating performance benchmarks that drive the `tt` binary
/// end-to-end: I/O, structural validation, conversion, and (for
/// `with_import`) the full import-and-overwrite transaction.
#[derive(Debug, Clone)]
pub struct BenchmarkSpec {
    data_config: DataConfig,
    measurement_config: MeasurementConfig,
    import: bool,
}

impl Default for BenchmarkSpec {
    fn default() -> Self {
        Self {
            data_config: DataConfig { days: 100, events_per_day: 20 },
            measurement_config: MeasurementConfig::default(),
            import: false,
        }
    }
}

impl BenchmarkSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_size(mut self, days: usize, events_per_day: usize) -> Self {
        self.data_config = DataConfig { days, events_per_day };
        self
    }

    pub fn with_import(mut self, import: bool) -> Self {
        self.import = import;
        self
    }

    pub fn add_to_group(&self, group: &mut BenchmarkGroup<WallTime>, label: &str) {
        let total_entries = (self.data_config.days * self.data_config.events_per_day) as u64;

        group.sampling_mode(SamplingMode::Auto);
        group.sample_size(self.measurement_config.sample_size);
        group.measurement_time(self.measurement_config.measurement_time);
        group.warm_up_time(self.measurement_config.warm_up_time);
        group.throughput(Throughput::Elements(total_entries));

        group.bench_function(label, self.create_benchmark_fn());
    }

    fn create_benchmark_fn(&self) -> impl Fn(&mut criterion::Bencher) + '_ {
        move |bencher: &mut criterion::Bencher| {
            bencher.iter_batched(
                || self.generate_bundle(),
                |bundle| {
                    let output = bundle.execute_cli(self.import);
                    assert!(
                        output.status.success(),
                        "CLI command failed with status {:?}\nstderr: {}\nstdout: {}",
                        output.status,
                        String::from_utf8_lossy(&output.stderr),
                        String::from_utf8_lossy(&output.stdout)
                    );
                },
                BatchSize::SmallInput,
            );
        }
    }
}

pub struct BenchmarkSuite;

impl BenchmarkSuite {
    pub fn large_dataset_benchmark() -> BenchmarkSpec {
        // ~8k events across 200 daily-log files - enough to expose an O(N^2)
        // regression in the converter's tail-stitching pass or the importer's
        // per-month transaction.
        BenchmarkSpec::new().with_data_size(200, 40)
    }

    pub fn large_ingest_benchmark() -> BenchmarkSpec {
        BenchmarkSpec::new().with_data_size(200, 40).with_import(true)
    }
}

#[derive(Debug, Clone)]
struct DataConfig {
    days: usize,
    events_per_day: usize,
}

#[derive(Debug, Clone)]
struct MeasurementConfig {
    sample_size: usize,
    measurement_time: Duration,
    warm_up_time: Duration,
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            sample_size: 20,
            measurement_time: Duration::from_secs(8),
            warm_up_time: Duration::from_secs(3),
        }
    }
}

/// A fully materialized temp bundle: source log files under `input/`, an
/// empty `output/` directory, and a minimal but complete `meta/` config
/// tree so `Runtime::bootstrap` succeeds without touching a real bundle.
struct TempBundle {
    root: assert_fs::TempDir,
}

impl BenchmarkSpec {
    fn generate_bundle(&self) -> TempBundle {
        let root = assert_fs::TempDir::new().expect("failed to create temp bundle root");
        self.write_meta(&root);
        self.write_source_files(&root);
        std::fs::create_dir_all(root.path().join("output")).expect("failed to create output dir");
        TempBundle { root }
    }

    fn write_meta(&self, root: &assert_fs::TempDir) {
        std::fs::create_dir_all(root.path().join("meta")).expect("failed to create meta dir");
        root.child("meta/bundle.toml")
            .write_str(
                r#"
schema_version = 1
profile = "bench"
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
"#,
            )
            .expect("failed to write bundle.toml");

        root.child("meta/interval.toml")
            .write_str(
                r#"
wake_keywords = ["起床"]
day_remark_prefix = "@"
remark_prefixes = ["//"]
[aliases]
work = "work"
meal = "meal"
sleep = "sleep"
[duration_rules]
toilet = 600
"#,
            )
            .expect("failed to write interval.toml");

        root.child("meta/heatmap.toml")
            .write_str(
                r#"
[thresholds]
positive_hours = [1.0]
[palettes]
default = ["#000000", "#ffffff"]
[defaults]
light_palette = "default"
dark_palette = "default"
"#,
            )
            .expect("failed to write heatmap.toml");
    }

    fn write_source_files(&self, root: &assert_fs::TempDir) {
        use std::fmt::Write;

        std::fs::create_dir_all(root.path().join("input")).expect("failed to create input dir");
        for file_idx in 0..self.data_config.days {
            let day = 1 + (file_idx % 27);
            let month = 1 + (file_idx / 27) % 12;
            let mut content = String::with_capacity(self.data_config.events_per_day * 24);
            let _ = writeln!(&mut content, "2024-{month:02}-{day:02}");
            content.push_str("0600起床\n");

            let mut minute_cursor = 601;
            for _ in 0..self.data_config.events_per_day {
                let hh = (minute_cursor / 60) % 24;
                let mm = minute_cursor % 60;
                let _ = writeln!(&mut content, "{hh:02}{mm:02}work // benchmark activity");
                minute_cursor += 15;
            }

            root.child(format!("input/day-{file_idx:04}.txt"))
                .write_str(&content)
                .expect("failed to write source day file");
        }
    }
}

impl TempBundle {
    fn execute_cli(&self, import: bool) -> std::process::Output {
        let mut cmd = Command::cargo_bin("tt").expect("failed to create cargo command");
        cmd.env("TT_BUNDLE_ROOT", self.root.path())
            .env("TT_DB_PATH", self.root.path().join("bench.sqlite3"))
            .env("TT_STATS_DIR", self.root.path().join("stats"));

        if import {
            cmd.arg("ingest");
        } else {
            cmd.arg("convert");
        }
        cmd.arg("--input")
            .arg(self.root.path().join("input"))
            .arg("--output")
            .arg(self.root.path().join("output"));

        cmd.output().expect("CLI execution failed")
    }
}
