//! Shared fixture builders for the acceptance suite: an in-memory store, a
//! minimal `IntervalConfig`, and an `AppConfig` built directly from struct
//! literals (every field in the config layer is `pub`, so tests don't need
//! to round-trip through TOML fixture files on disk).

use std::collections::HashMap;

use chrono::NaiveDate;
use time_tracker_core::config::{
    AppConfig, BundleConfig, BundlePaths, ConverterPaths, FileList, IntervalConfig, HeatmapConfig,
    ReportFormatPaths, ReportPaths, VisualizationPaths,
};
use time_tracker_core::domain::{DailyLog, ProcessedActivity};
use time_tracker_core::import::ImportService;
use time_tracker_core::reporting::{Format, ReportKind};
use time_tracker_core::storage::Repository;

#[must_use]
pub fn interval_config() -> IntervalConfig {
    let mut aliases = HashMap::new();
    for name in ["study_math", "study_cs", "study_math_calc", "meal", "sleep", "study"] {
        aliases.insert(name.to_string(), name.to_string());
    }
    IntervalConfig {
        wake_keywords: vec!["起床".to_string()],
        aliases,
        duration_rules: HashMap::new(),
        remark_prefixes: vec!["//".to_string()],
        day_remark_prefix: "@".to_string(),
    }
}

#[must_use]
pub fn heatmap_config() -> HeatmapConfig {
    let mut palettes = HashMap::new();
    palettes.insert("default".to_string(), vec!["#000000".to_string(), "#ffffff".to_string()]);
    HeatmapConfig {
        positive_hour_thresholds: vec![1.0],
        palettes,
        light_palette: "default".to_string(),
        dark_palette: "default".to_string(),
    }
}

/// An `AppConfig` declaring exactly the `(kind, format)` pairs in `declared`.
#[must_use]
pub fn app_config(declared: &[(ReportKind, Format)]) -> AppConfig {
    let mut markdown = ReportFormatPaths::default();
    let mut latex = ReportFormatPaths::default();
    let mut typst = ReportFormatPaths::default();

    for (kind, format) in declared {
        let slot = match format {
            Format::Markdown => &mut markdown,
            Format::Latex => &mut latex,
            Format::Typst => &mut typst,
        };
        let path = Some("dummy".to_string());
        match kind {
            ReportKind::Day => slot.day = path,
            ReportKind::Month => slot.month = path,
            ReportKind::Week => slot.week = path,
            ReportKind::Year => slot.year = path,
            ReportKind::Period | ReportKind::Range => slot.period = path,
        }
    }

    AppConfig {
        bundle: BundleConfig {
            schema_version: 1,
            profile: "test".to_string(),
            file_list: FileList::default(),
            paths: BundlePaths {
                converter: ConverterPaths { interval_config: String::new() },
                visualization: VisualizationPaths { heatmap: String::new() },
                reports: ReportPaths { markdown, latex, typst },
            },
        },
        bundle_root: std::path::PathBuf::new(),
        interval: interval_config(),
        heatmap: heatmap_config(),
        commands: HashMap::new(),
        declared_formatters: declared.to_vec(),
    }
}

/// Builds a single-activity `DailyLog` for `date` under `project_path`
/// lasting `duration_seconds`, starting at local midnight.
#[must_use]
pub fn single_activity_day(date: &str, project_path: &str, duration_seconds: i64) -> DailyLog {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    let mut log = DailyLog::new(parsed);
    let start_ts = log.midnight_epoch();
    log.processed_activities.push(ProcessedActivity {
        logical_id: 1,
        start_ts,
        end_ts: start_ts + duration_seconds,
        start_str: "00:00".to_string(),
        end_str: "00:00".to_string(),
        project_path: project_path.to_string(),
        duration_seconds,
        remark: None,
    });
    log
}

/// Imports `days` (each already a fully materialized `DailyLog`) into
/// `repo` in one append-mode transaction.
pub fn seed(repo: &mut Repository, days: Vec<DailyLog>) {
    let mut processed: HashMap<String, Vec<DailyLog>> = HashMap::new();
    for day in days {
        processed.entry(format!("{}", day.date.format("%Y-%m"))).or_default().push(day);
    }
    let mut service = ImportService::new(repo);
    let stats = service.import_from_memory(&processed, None);
    assert!(stats.transaction_success, "seed import failed: {:?}", stats.error_message);
}
