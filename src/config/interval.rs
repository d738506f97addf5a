//! Converter configuration: wake keywords, the alias map from raw event
//! text to hierarchical project paths, duration-rule keywords, and remark
//! prefixes (spec section 4, section 6).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::CoreError;

#[derive(Debug, Clone, Deserialize)]
struct RawIntervalConfig {
    #[serde(default)]
    wake_keywords: Vec<String>,
    #[serde(default)]
    aliases: HashMap<String, String>,
    #[serde(default)]
    duration_rules: HashMap<String, u32>,
    #[serde(default)]
    remark_prefixes: Vec<String>,
    day_remark_prefix: String,
}

#[derive(Debug, Clone)]
pub struct IntervalConfig {
    /// Event `text` values that mark the start of the tracked day.
    pub wake_keywords: Vec<String>,
    /// Raw event text -> `_`-joined hierarchical project path.
    pub aliases: HashMap<String, String>,
    /// Event text -> fixed duration in seconds for duration-rule keywords.
    pub duration_rules: HashMap<String, u32>,
    /// Prefixes (`//`, `#`, `;`, ...) that introduce an inline remark.
    pub remark_prefixes: Vec<String>,
    /// Prefix that marks a whole line as a day-level remark.
    pub day_remark_prefix: String,
}

impl IntervalConfig {
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("cannot read {}: {e}", path.display())))?;
        let parsed: RawIntervalConfig = toml::from_str(&raw)?;
        Self::from_raw(parsed)
    }

    fn from_raw(raw: RawIntervalConfig) -> Result<Self, CoreError> {
        if raw.wake_keywords.is_empty() {
            return Err(CoreError::Config(
                "interval config must declare at least one wake keyword".into(),
            ));
        }
        if raw.remark_prefixes.is_empty() {
            return Err(CoreError::Config(
                "interval config must declare at least one remark prefix".into(),
            ));
        }
        let overlap = raw
            .aliases
            .keys()
            .find(|k| raw.duration_rules.contains_key(k.as_str()));
        if let Some(key) = overlap {
            return Err(CoreError::Config(format!(
                "'{key}' is declared as both an alias and a duration-rule keyword"
            )));
        }

        Ok(Self {
            wake_keywords: raw.wake_keywords,
            aliases: raw.aliases,
            duration_rules: raw.duration_rules,
            remark_prefixes: raw.remark_prefixes,
            day_remark_prefix: raw.day_remark_prefix,
        })
    }

    #[must_use]
    pub fn is_wake_keyword(&self, text: &str) -> bool {
        self.wake_keywords.iter().any(|k| k == text)
    }

    #[must_use]
    pub fn resolve_alias(&self, text: &str) -> Option<&str> {
        self.aliases.get(text).map(String::as_str)
    }

    #[must_use]
    pub fn duration_for(&self, text: &str) -> Option<u32> {
        self.duration_rules.get(text).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawIntervalConfig {
        let mut aliases = HashMap::new();
        aliases.insert("study_math".to_string(), "study_math".to_string());
        let mut duration_rules = HashMap::new();
        duration_rules.insert("toilet".to_string(), 600);
        RawIntervalConfig {
            wake_keywords: vec!["起床".to_string()],
            aliases,
            duration_rules,
            remark_prefixes: vec!["//".to_string(), "#".to_string(), ";".to_string()],
            day_remark_prefix: "@".to_string(),
        }
    }

    #[test]
    fn rejects_alias_duration_rule_overlap() {
        let mut raw = sample();
        raw.duration_rules.insert("study_math".to_string(), 60);
        assert!(IntervalConfig::from_raw(raw).is_err());
    }

    #[test]
    fn accepts_well_formed_config() {
        let cfg = IntervalConfig::from_raw(sample()).unwrap();
        assert!(cfg.is_wake_keyword("起床"));
        assert_eq!(cfg.duration_for("toilet"), Some(600));
    }
}
