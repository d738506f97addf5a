//! Heatmap palette configuration (spec section 6, SPEC_FULL section 11).
//!
//! The palette shape is validated at bundle-load time even though this
//! core has no renderer for it (out of scope per the spec's non-goals):
//! a malformed palette should fail fast at startup rather than surface
//! as a confusing error the first time something downstream reads it.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::CoreError;

#[derive(Debug, Clone, Deserialize)]
struct RawHeatmapConfig {
    thresholds: Thresholds,
    palettes: HashMap<String, Vec<String>>,
    defaults: Defaults,
}

#[derive(Debug, Clone, Deserialize)]
struct Thresholds {
    positive_hours: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct Defaults {
    light_palette: String,
    dark_palette: String,
}

#[derive(Debug, Clone)]
pub struct HeatmapConfig {
    pub positive_hour_thresholds: Vec<f64>,
    pub palettes: HashMap<String, Vec<String>>,
    pub light_palette: String,
    pub dark_palette: String,
}

impl HeatmapConfig {
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("cannot read {}: {e}", path.display())))?;
        let parsed: RawHeatmapConfig = toml::from_str(&raw)?;
        Self::from_raw(parsed)
    }

    fn from_raw(raw: RawHeatmapConfig) -> Result<Self, CoreError> {
        let thresholds = raw.thresholds.positive_hours;
        if thresholds.is_empty() {
            return Err(CoreError::Config(
                "heatmap thresholds.positive_hours must not be empty".into(),
            ));
        }
        if thresholds.iter().any(|h| *h <= 0.0) {
            return Err(CoreError::Config(
                "heatmap thresholds.positive_hours must all be positive".into(),
            ));
        }
        if !thresholds.windows(2).all(|w| w[0] < w[1]) {
            return Err(CoreError::Config(
                "heatmap thresholds.positive_hours must be strictly increasing".into(),
            ));
        }

        let expected_colors = thresholds.len() + 1;
        for (name, colors) in &raw.palettes {
            if colors.len() != expected_colors {
                return Err(CoreError::Config(format!(
                    "heatmap palette '{name}' has {} colors, expected {expected_colors} (thresholds + 1)",
                    colors.len()
                )));
            }
            for color in colors {
                if !is_hex_color(color) {
                    return Err(CoreError::Config(format!(
                        "heatmap palette '{name}' has invalid color '{color}'"
                    )));
                }
            }
        }

        if !raw.palettes.contains_key(&raw.defaults.light_palette) {
            return Err(CoreError::Config(format!(
                "heatmap defaults.light_palette '{}' is not a declared palette",
                raw.defaults.light_palette
            )));
        }
        if !raw.palettes.contains_key(&raw.defaults.dark_palette) {
            return Err(CoreError::Config(format!(
                "heatmap defaults.dark_palette '{}' is not a declared palette",
                raw.defaults.dark_palette
            )));
        }

        Ok(Self {
            positive_hour_thresholds: thresholds,
            palettes: raw.palettes,
            light_palette: raw.defaults.light_palette,
            dark_palette: raw.defaults.dark_palette,
        })
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(thresholds: Vec<f64>, colors: Vec<&str>) -> RawHeatmapConfig {
        let mut palettes = HashMap::new();
        palettes.insert(
            "default".to_string(),
            colors.into_iter().map(String::from).collect(),
        );
        RawHeatmapConfig {
            thresholds: Thresholds { positive_hours: thresholds },
            palettes,
            defaults: Defaults {
                light_palette: "default".to_string(),
                dark_palette: "default".to_string(),
            },
        }
    }

    #[test]
    fn rejects_non_increasing_thresholds() {
        let cfg = raw(vec![2.0, 1.0], vec!["#000000", "#111111", "#222222"]);
        assert!(HeatmapConfig::from_raw(cfg).is_err());
    }

    #[test]
    fn rejects_palette_with_wrong_color_count() {
        let cfg = raw(vec![1.0, 2.0], vec!["#000000", "#111111"]);
        assert!(HeatmapConfig::from_raw(cfg).is_err());
    }

    #[test]
    fn accepts_well_formed_palette() {
        let cfg = raw(vec![1.0, 2.0, 4.0], vec!["#000000", "#111111", "#222222", "#333333"]);
        assert!(HeatmapConfig::from_raw(cfg).is_ok());
    }
}
