//! Shape of `meta/bundle.toml` (spec section 6).

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct BundleConfig {
    pub schema_version: u32,
    pub profile: String,
    pub file_list: FileList,
    pub paths: BundlePaths,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FileList {
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub optional: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BundlePaths {
    pub converter: ConverterPaths,
    pub visualization: VisualizationPaths,
    pub reports: ReportPaths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConverterPaths {
    pub interval_config: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisualizationPaths {
    pub heatmap: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportPaths {
    #[serde(default)]
    pub markdown: ReportFormatPaths,
    #[serde(default)]
    pub latex: ReportFormatPaths,
    #[serde(default)]
    pub typst: ReportFormatPaths,
}

/// Paths (relative to the bundle root) to the per-report-kind style files
/// for one output format. A `None` field means that `(kind, format)` pair
/// is not declared by the bundle (spec invariant 8).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ReportFormatPaths {
    pub day: Option<String>,
    pub month: Option<String>,
    pub period: Option<String>,
    pub week: Option<String>,
    pub year: Option<String>,
}
