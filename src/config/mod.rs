//! `AppConfig` and the bundle/command-default TOML layer (spec section 6,
//! SPEC_FULL section 10.3).
//!
//! Grounded on how `cetanu-dailylog` and `mradziej-tt-timetracker` load and
//! validate a TOML configuration tree before doing any real work, and on
//! the teacher's pattern of validating inputs eagerly at the boundary
//! (`cli::Args::from_date`). `AppConfig` is built once in the runtime
//! bootstrap (C13) and is immutable for the process lifetime.

mod bundle;
mod heatmap;
mod interval;

pub use bundle::{
    BundleConfig, BundlePaths, ConverterPaths, FileList, ReportFormatPaths, ReportPaths, VisualizationPaths,
};
pub use heatmap::HeatmapConfig;
pub use interval::IntervalConfig;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::CoreError;
use crate::reporting::{Format, ReportKind};

/// Per-command defaults loaded from `commands.<cmd>` tables.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CommandDefaults {
    pub format: Option<String>,
    pub date_check: Option<String>,
    pub save_processed_output: Option<bool>,
    pub validate_logic: Option<bool>,
    pub validate_structure: Option<bool>,
}

/// The fully validated, immutable application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bundle: BundleConfig,
    pub bundle_root: PathBuf,
    pub interval: IntervalConfig,
    pub heatmap: HeatmapConfig,
    pub commands: HashMap<String, CommandDefaults>,
    /// Every `(kind, format)` pair the bundle declares a report style file
    /// for; the formatter registry (C9) is built from exactly this set.
    pub declared_formatters: Vec<(ReportKind, Format)>,
}

impl AppConfig {
    /// Loads and validates the bundle at `bundle_root/meta/bundle.toml`,
    /// per spec section 6. Every declared path is checked to exist as a
    /// regular file; the heatmap palette shape is validated; command
    /// defaults (if present) are parsed permissively (missing `commands.*`
    /// keys simply mean "use built-in defaults").
    pub fn load(bundle_root: &Path) -> Result<Self, CoreError> {
        let bundle_path = bundle_root.join("meta").join("bundle.toml");
        let raw = fs::read_to_string(&bundle_path)
            .map_err(|e| CoreError::Config(format!("cannot read {}: {e}", bundle_path.display())))?;
        let bundle: BundleConfig = toml::from_str(&raw)?;

        for rel in &bundle.file_list.required {
            let full = bundle_root.join(rel);
            if !full.is_file() {
                return Err(CoreError::Config(format!(
                    "required bundle file missing or not a regular file: {}",
                    full.display()
                )));
            }
        }
        for rel in &bundle.file_list.optional {
            let full = bundle_root.join(rel);
            if full.exists() && !full.is_file() {
                return Err(CoreError::Config(format!(
                    "optional bundle file is not a regular file: {}",
                    full.display()
                )));
            }
        }

        let interval_path = bundle_root.join(&bundle.paths.converter.interval_config);
        let interval = IntervalConfig::load(&interval_path)?;

        let heatmap_path = bundle_root.join(&bundle.paths.visualization.heatmap);
        let heatmap = HeatmapConfig::load(&heatmap_path)?;

        let declared_formatters = collect_declared_formatters(bundle_root, &bundle.paths.reports)?;

        let commands = load_command_defaults(bundle_root)?;

        Ok(Self {
            bundle,
            bundle_root: bundle_root.to_path_buf(),
            interval,
            heatmap,
            commands,
            declared_formatters,
        })
    }

    #[must_use]
    pub fn supports(&self, kind: ReportKind, format: Format) -> bool {
        self.declared_formatters.contains(&(kind, format))
    }

    #[must_use]
    pub fn command_defaults(&self, command: &str) -> CommandDefaults {
        self.commands.get(command).cloned().unwrap_or_default()
    }
}

fn collect_declared_formatters(
    bundle_root: &Path,
    reports: &ReportPaths,
) -> Result<Vec<(ReportKind, Format)>, CoreError> {
    let mut declared = Vec::new();
    for (format, paths) in [
        (Format::Markdown, &reports.markdown),
        (Format::Latex, &reports.latex),
        (Format::Typst, &reports.typst),
    ] {
        for (kind, rel) in [
            (ReportKind::Day, &paths.day),
            (ReportKind::Month, &paths.month),
            (ReportKind::Period, &paths.period),
            (ReportKind::Week, &paths.week),
            (ReportKind::Year, &paths.year),
        ] {
            let Some(rel) = rel else { continue };
            let full = bundle_root.join(rel);
            if !full.is_file() {
                return Err(CoreError::Config(format!(
                    "declared report path is not a regular file: {}",
                    full.display()
                )));
            }
            declared.push((kind, format));
        }
    }
    Ok(declared)
}

fn load_command_defaults(bundle_root: &Path) -> Result<HashMap<String, CommandDefaults>, CoreError> {
    let path = bundle_root.join("meta").join("commands.toml");
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let raw = fs::read_to_string(&path)?;
    let table: CommandsTable = toml::from_str(&raw)?;
    Ok(table.commands)
}

#[derive(Debug, Deserialize)]
struct CommandsTable {
    #[serde(default)]
    commands: HashMap<String, CommandDefaults>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut f = fs::File::create(path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn load_rejects_missing_required_file() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("meta/bundle.toml"),
            r#"
                schema_version = 1
                profile = "default"
                [file_list]
                required = ["missing.txt"]
                optional = []
                [paths.converter]
                interval_config = "meta/interval.toml"
                [paths.visualization]
                heatmap = "meta/heatmap.toml"
                [paths.reports.markdown]
                [paths.reports.latex]
                [paths.reports.typst]
            "#,
        );
        let err = AppConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }
}
